use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_customer_tables::Migration),
            Box::new(m20240301_000002_create_catalog_tables::Migration),
            Box::new(m20240301_000003_create_cart_order_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_customer_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_customer_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create address table aligned with entities::address Model
            manager
                .create_table(
                    Table::create()
                        .table(Address::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Address::AddressId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Address::Street).string().not_null())
                        .col(ColumnDef::new(Address::City).string().not_null())
                        .col(ColumnDef::new(Address::State).string().not_null())
                        .col(ColumnDef::new(Address::Zip).string().not_null())
                        .to_owned(),
                )
                .await?;

            // Dedup lookups scan all four columns together
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_address_fields")
                        .table(Address::Table)
                        .col(Address::Street)
                        .col(Address::City)
                        .col(Address::State)
                        .col(Address::Zip)
                        .to_owned(),
                )
                .await?;

            // Create customer table aligned with entities::customer Model
            manager
                .create_table(
                    Table::create()
                        .table(Customer::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customer::CustomerId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customer::FirstName).string().not_null())
                        .col(ColumnDef::new(Customer::MiddleName).string().null())
                        .col(ColumnDef::new(Customer::LastName).string().not_null())
                        .col(
                            ColumnDef::new(Customer::ShippingAddress)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Customer::BillingAddress)
                                .big_integer()
                                .null(),
                        )
                        .col(ColumnDef::new(Customer::Email).string().not_null())
                        .col(ColumnDef::new(Customer::Password).string().not_null())
                        .col(ColumnDef::new(Customer::PhoneNumber).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customer_email")
                        .table(Customer::Table)
                        .col(Customer::Email)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customer::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Address::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Address {
        Table,
        AddressId,
        Street,
        City,
        State,
        Zip,
    }

    #[derive(DeriveIden)]
    pub(super) enum Customer {
        Table,
        CustomerId,
        FirstName,
        MiddleName,
        LastName,
        ShippingAddress,
        BillingAddress,
        Email,
        Password,
        PhoneNumber,
    }
}

mod m20240301_000002_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create catalog_images table aligned with entities::catalog_image Model
            manager
                .create_table(
                    Table::create()
                        .table(CatalogImages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CatalogImages::ImageId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(CatalogImages::MimeType).string().not_null())
                        .col(ColumnDef::new(CatalogImages::AltText).string().null())
                        .to_owned(),
                )
                .await?;

            // Create item_catalog table aligned with entities::catalog_item Model
            manager
                .create_table(
                    Table::create()
                        .table(ItemCatalog::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ItemCatalog::ItemId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ItemCatalog::ItemName).string().not_null())
                        .col(
                            ColumnDef::new(ItemCatalog::Description)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ItemCatalog::Category).string().not_null())
                        .col(ColumnDef::new(ItemCatalog::ItemImage).big_integer().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_item_catalog_category")
                        .table(ItemCatalog::Table)
                        .col(ItemCatalog::Category)
                        .to_owned(),
                )
                .await?;

            // Create variant_catalog table aligned with entities::variant Model.
            // Variant ids are assigned per item, so the key is composite.
            manager
                .create_table(
                    Table::create()
                        .table(VariantCatalog::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VariantCatalog::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VariantCatalog::VariantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VariantCatalog::Size).string().null())
                        .col(ColumnDef::new(VariantCatalog::Color).string().null())
                        .col(
                            ColumnDef::new(VariantCatalog::Price)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(VariantCatalog::Weight).double().not_null())
                        .col(
                            ColumnDef::new(VariantCatalog::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(VariantCatalog::VariantImage)
                                .big_integer()
                                .null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(VariantCatalog::ItemId)
                                .col(VariantCatalog::VariantId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_variant_catalog_item")
                                .from(VariantCatalog::Table, VariantCatalog::ItemId)
                                .to(ItemCatalog::Table, ItemCatalog::ItemId),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VariantCatalog::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ItemCatalog::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CatalogImages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum CatalogImages {
        Table,
        ImageId,
        MimeType,
        AltText,
    }

    #[derive(DeriveIden)]
    pub(super) enum ItemCatalog {
        Table,
        ItemId,
        ItemName,
        Description,
        Category,
        ItemImage,
    }

    #[derive(DeriveIden)]
    pub(super) enum VariantCatalog {
        Table,
        ItemId,
        VariantId,
        Size,
        Color,
        Price,
        Weight,
        Stock,
        VariantImage,
    }
}

mod m20240301_000003_create_cart_order_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_cart_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create shopping_cart table aligned with entities::cart_item Model
            manager
                .create_table(
                    Table::create()
                        .table(ShoppingCart::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ShoppingCart::CustomerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ShoppingCart::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ShoppingCart::VariantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ShoppingCart::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(ShoppingCart::CustomerId)
                                .col(ShoppingCart::ItemId)
                                .col(ShoppingCart::VariantId),
                        )
                        .to_owned(),
                )
                .await?;

            // Create orders table aligned with entities::order Model
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::OrderId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::CustomerId).big_integer().not_null())
                        .col(
                            ColumnDef::new(Orders::ShippingAddress)
                                .big_integer()
                                .null(),
                        )
                        .col(ColumnDef::new(Orders::BillingAddress).big_integer().null())
                        .col(
                            ColumnDef::new(Orders::TotalPrice)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::TotalWeight).double().not_null())
                        .col(ColumnDef::new(Orders::Status).string().null())
                        .col(
                            ColumnDef::new(Orders::OrderDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            // Create order_item table aligned with entities::order_item Model
            manager
                .create_table(
                    Table::create()
                        .table(OrderItem::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderItem::OrderId).big_integer().not_null())
                        .col(ColumnDef::new(OrderItem::ItemId).big_integer().not_null())
                        .col(
                            ColumnDef::new(OrderItem::VariantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItem::Quantity).integer().not_null())
                        .primary_key(
                            Index::create()
                                .col(OrderItem::OrderId)
                                .col(OrderItem::ItemId)
                                .col(OrderItem::VariantId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_item_order")
                                .from(OrderItem::Table, OrderItem::OrderId)
                                .to(Orders::Table, Orders::OrderId),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItem::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ShoppingCart::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ShoppingCart {
        Table,
        CustomerId,
        ItemId,
        VariantId,
        Quantity,
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        OrderId,
        CustomerId,
        ShippingAddress,
        BillingAddress,
        TotalPrice,
        TotalWeight,
        Status,
        OrderDate,
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderItem {
        Table,
        OrderId,
        ItemId,
        VariantId,
        Quantity,
    }
}
