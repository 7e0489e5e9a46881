pub mod addresses;
pub mod carts;
pub mod catalog;
pub mod customers;
pub mod orders;

pub use addresses::AddressService;
pub use carts::CartService;
pub use catalog::CatalogService;
pub use customers::CustomerService;
pub use orders::OrderService;
