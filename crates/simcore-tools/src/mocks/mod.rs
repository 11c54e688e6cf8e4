mod browser;
mod email;
mod shopify;

pub use browser::MockBrowserTool;
pub use email::MockEmailTool;
pub use shopify::MockShopifyTool;
