use serde::{Deserialize, Serialize};

/// A product descriptor as handed to the cart by the catalog UI.
///
/// Carries everything a [`LineItem`] does except the quantity, which the
/// cart owns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub price: f64,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

/// One product entry in the cart.
///
/// `title`, `image_url` and `price` are opaque to the cart and are never
/// validated. Any `LineItem` held by a [`Cart`](super::Cart) has
/// `quantity >= 1`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
}

impl LineItem {
    /// A fresh line item for `product` with a quantity of one.
    pub fn from_product(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity: 1,
        }
    }

    /// The descriptor half of this item, without the quantity.
    pub fn product(&self) -> Product {
        Product {
            id: self.id.clone(),
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
        }
    }
}

impl From<Product> for LineItem {
    fn from(product: Product) -> Self {
        LineItem::from_product(product)
    }
}
