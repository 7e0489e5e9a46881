pub mod address;
pub mod cart_item;
pub mod catalog_image;
pub mod catalog_item;
pub mod customer;
pub mod order;
pub mod order_item;
pub mod variant;

// Re-export entities
pub use address::{Entity as Address, Model as AddressModel};
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use catalog_image::{Entity as CatalogImage, Model as CatalogImageModel};
pub use catalog_item::{Entity as CatalogItem, Model as CatalogItemModel};
pub use customer::{Entity as Customer, Model as CustomerModel};
pub use order::{Entity as Order, Model as OrderModel};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use variant::{Entity as Variant, Model as VariantModel};
