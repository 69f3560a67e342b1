use std::path::Path;

use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 10;

/// Lower-cased extension of a client-supplied file name, including the dot.
///
/// Returns an empty string when the name has no usable extension.
pub fn photo_extension(original_name: &str) -> String {
    let Some(ext) = Path::new(original_name).extension().and_then(|e| e.to_str()) else {
        return String::new();
    };

    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return String::new();
    }

    format!(".{}", ext.to_ascii_lowercase())
}

/// Storage name for an uploaded photo: `<user_id>_<random uuid><extension>`.
pub fn photo_file_name(user_id: Uuid, original_name: Option<&str>) -> String {
    let ext = original_name.map(photo_extension).unwrap_or_default();
    format!("{}_{}{}", user_id, Uuid::new_v4(), ext)
}
