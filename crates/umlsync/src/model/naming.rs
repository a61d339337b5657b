//! Naming rules shared by editors and the command layer

use crate::core::lexicon::fold_accents;
use crate::core::DiagramError;

/// Attribute name that every generated entity already carries
pub const RESERVED_ATTRIBUTE: &str = "id";

/// Normalize a spoken or typed class name to PascalCase
///
/// Accents are folded, whitespace is removed and every word is capitalized
/// with the rest of the word lowercased: `"orden de compra"` becomes
/// `"OrdenDeCompra"`.
pub fn normalize_class_name(raw: &str) -> String {
    fold_accents(raw.trim())
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `^[A-Z][A-Za-z]*$`
pub fn is_valid_class_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

pub fn validate_class_name(name: &str) -> Result<(), DiagramError> {
    if is_valid_class_name(name) {
        Ok(())
    } else {
        Err(DiagramError::InvalidClassName {
            name: name.to_string(),
        })
    }
}

/// True when `id` appears as a standalone word of the attribute
pub fn is_reserved_attribute(attribute: &str) -> bool {
    attribute
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|word| word.eq_ignore_ascii_case(RESERVED_ATTRIBUTE))
}

pub fn validate_attribute(class: &str, attribute: &str) -> Result<(), DiagramError> {
    if is_reserved_attribute(attribute) {
        return Err(DiagramError::ReservedAttribute {
            class: class.to_string(),
            attribute: attribute.to_string(),
        });
    }
    if attribute.trim().is_empty() || attribute.contains(['{', '}', '\n']) {
        return Err(DiagramError::invalid_command(format!(
            "attribute '{}' cannot be written as a class body line",
            attribute
        )));
    }
    Ok(())
}
