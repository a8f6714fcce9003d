use serde::{Deserialize, Serialize};
use url::Url;

use storefront_core::{Entity, Price, ProductId};

/// Product category.
///
/// The backend sends localized labels; the English names are accepted too so
/// fixtures and logs stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[serde(alias = "софт-скил")]
    SoftSkill,
    #[serde(alias = "хард-скил")]
    HardSkill,
    #[serde(alias = "другое")]
    Other,
    #[serde(alias = "дополнительное")]
    Additional,
    #[serde(alias = "кнопка")]
    Button,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::SoftSkill,
        Category::HardSkill,
        Category::Other,
        Category::Additional,
        Category::Button,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::SoftSkill => "soft-skill",
            Category::HardSkill => "hard-skill",
            Category::Other => "other",
            Category::Additional => "additional",
            Category::Button => "button",
        }
    }

    /// Short modifier views append to their category badge class.
    pub fn modifier(&self) -> &'static str {
        match self {
            Category::SoftSkill => "soft",
            Category::HardSkill => "hard",
            Category::Other => "other",
            Category::Additional => "additional",
            Category::Button => "button",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog product, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    title: String,
    description: String,
    image: String,
    category: Category,
    /// `None` means "not for sale".
    price: Option<Price>,
}

impl Product {
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        category: Category,
        price: Option<Price>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            image: String::new(),
            category,
            price,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn id_typed(&self) -> &ProductId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn price(&self) -> Option<Price> {
        self.price
    }

    /// Only priced products may enter a basket.
    pub fn is_purchasable(&self) -> bool {
        self.price.is_some()
    }

    /// Rewrite a relative image reference against the CDN base.
    ///
    /// Absolute URLs are left alone. The base is treated as a directory, so
    /// `/a.svg` on `https://cdn/content` becomes `https://cdn/content/a.svg`.
    pub fn resolve_image(mut self, cdn_base: &Url) -> Self {
        if self.image.is_empty() || Url::parse(&self.image).is_ok() {
            return self;
        }

        let mut base = cdn_base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        if let Ok(resolved) = base.join(self.image.trim_start_matches('/')) {
            self.image = resolved.into();
        }
        self
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A product as the views see it, with flags derived from current state.
///
/// Built on demand and never stored, so the flags cannot drift from the
/// catalog or the basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub product: Product,
    pub purchasable: bool,
    pub in_basket: bool,
    /// Badge modifier of the product's category.
    pub modifier: &'static str,
}

impl CatalogEntry {
    pub fn derive(product: Product, in_basket: bool) -> Self {
        Self {
            purchasable: product.is_purchasable(),
            modifier: product.category().modifier(),
            in_basket,
            product,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_payload_with_localized_category() {
        let json = r#"{
            "id": "854cef69-976d-4c2a-a18c-2aa45046c390",
            "description": "Если планируете решать задачи в тренажёре, берите два.",
            "image": "/5_Dots.svg",
            "title": "+1 час в сутках",
            "category": "софт-скил",
            "price": 750
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category(), Category::SoftSkill);
        assert_eq!(product.price(), Some(Price::new(750)));
        assert!(product.is_purchasable());
    }

    #[test]
    fn null_price_means_not_for_sale() {
        let json = r#"{
            "id": "b06cde61-912f-4663-9751-09956c0eed67",
            "description": "",
            "image": "/Shell.svg",
            "title": "Мамка-таймер",
            "category": "другое",
            "price": null
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price(), None);
        assert!(!product.is_purchasable());
    }

    #[test]
    fn english_category_names_are_accepted() {
        for category in Category::ALL {
            let json = format!("\"{}\"", category.as_str());
            let parsed: Category = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn resolve_image_joins_relative_paths_onto_the_cdn() {
        let cdn = Url::parse("https://cdn.example/content/weblarek").unwrap();

        let relative = Product::new(ProductId::new("p1"), "A", Category::Other, None)
            .with_image("/a.svg")
            .resolve_image(&cdn);
        assert_eq!(relative.image(), "https://cdn.example/content/weblarek/a.svg");

        let absolute = Product::new(ProductId::new("p2"), "B", Category::Other, None)
            .with_image("https://elsewhere/b.svg")
            .resolve_image(&cdn);
        assert_eq!(absolute.image(), "https://elsewhere/b.svg");

        let missing = Product::new(ProductId::new("p3"), "C", Category::Other, None).resolve_image(&cdn);
        assert_eq!(missing.image(), "");
    }

    #[test]
    fn category_modifiers() {
        let modifiers: Vec<_> = Category::ALL.iter().map(Category::modifier).collect();
        assert_eq!(modifiers, vec!["soft", "hard", "other", "additional", "button"]);
    }

    #[test]
    fn entry_serializes_flat() {
        let entry = CatalogEntry::derive(
            Product::new(ProductId::new("p1"), "A", Category::Button, Some(Price::new(5))),
            false,
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], "p1");
        assert_eq!(value["category"], "button");
        assert_eq!(value["in_basket"], false);
        assert_eq!(value["purchasable"], true);
        assert_eq!(value["modifier"], "button");
    }
}
