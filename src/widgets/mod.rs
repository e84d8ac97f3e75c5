//! Built-in tool widgets.
//!
//! Every widget is a self-contained, stateless form: it renders its input
//! controls, an output area and the script that performs the transform in
//! the browser. The heavy lifting (random values, JSON parsing, Base64,
//! QR encoding) is left to browser primitives or an external QR script.
//!
//! | Tag | Widget |
//! |-----|--------|
//! | `UUIDGenerator` | v4 UUIDs, batch, case and hyphen options |
//! | `RandomKey` | Random passwords from selectable character classes |
//! | `QRcode` | Text to QR code canvas with PNG download |
//! | `CurrencyConverter` | Exchange-rate conversion against a JSON API |
//! | `JsonFormatter` | Pretty-print or minify JSON |
//! | `Base64Converter` | UTF-8 safe Base64 encode/decode |
//! | `ArticleMetadata` | Word count and reading time of the current page |

pub mod converters;
pub mod generators;
pub mod metadata;

use crate::registry::{ComponentRegistry, RegistryError};
use std::sync::Arc;

/// Tag names of the built-in widgets, in registration order.
pub const BUILTIN: [&str; 7] = [
    "UUIDGenerator",
    "RandomKey",
    "ArticleMetadata",
    "CurrencyConverter",
    "QRcode",
    "JsonFormatter",
    "Base64Converter",
];

/// Register every built-in widget. Fails if any name is already taken.
pub fn register_builtin(registry: &mut ComponentRegistry) -> Result<(), RegistryError> {
    registry.register("UUIDGenerator", Arc::new(generators::UuidGenerator))?;
    registry.register("RandomKey", Arc::new(generators::RandomKey))?;
    registry.register("ArticleMetadata", Arc::new(metadata::ArticleMetadata))?;
    registry.register("CurrencyConverter", Arc::new(converters::CurrencyConverter))?;
    registry.register("QRcode", Arc::new(generators::QrCode))?;
    registry.register("JsonFormatter", Arc::new(converters::JsonFormatter))?;
    registry.register("Base64Converter", Arc::new(converters::Base64Converter))?;
    Ok(())
}

/// A registry holding exactly the built-in widgets.
pub fn builtin_registry() -> Result<ComponentRegistry, RegistryError> {
    let mut registry = ComponentRegistry::new();
    register_builtin(&mut registry)?;
    Ok(registry)
}
