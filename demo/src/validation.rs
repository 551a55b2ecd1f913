use kit_validator::{FieldLevel, Validator};

/// Letters, digits and underscores, 3 to 20 long, starting with a letter.
pub fn is_username(fl: &FieldLevel<'_>) -> bool {
    let name = fl.as_str();
    let mut chars = name.chars();

    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_with_letter
        && (3..=20).contains(&name.len())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The app validator: built-in rules plus `username`.
pub fn validator() -> kit_validator::Result<Validator> {
    Validator::builder()
        .custom_tag("username", is_username)
        .message("username", |field: &str, _: &str| {
            format!("{field} must be 3-20 letters, digits or underscores and start with a letter")
        })
        .build()
}
