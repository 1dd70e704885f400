//! Small helpers shared by the plugins

use serde::de::DeserializeOwned;
use thiserror::Error;

const DEFAULT_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Strip the `\0` padding Metaplex programs use for fixed-width strings
pub fn remove_empty_chars(value: &str) -> String {
    value.replace('\0', "")
}

/// Right-pad `value` with `\0` up to `chars` characters
pub fn pad_empty_chars(value: &str, chars: usize) -> String {
    let len = value.chars().count();
    let mut padded = String::with_capacity(value.len() + chars.saturating_sub(len));
    padded.push_str(value);
    padded.extend(std::iter::repeat('\0').take(chars.saturating_sub(len)));
    padded
}

/// Split `items` into owned chunks of at most `size` elements
///
/// A `size` of zero yields a single chunk holding everything.
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }
    if size == 0 {
        return vec![items.to_vec()];
    }
    items.chunks(size).map(<[T]>::to_vec).collect()
}

/// Map over `left`, pairing each element with the element of `right` at the same index, if any
pub fn zip_map<T, U, V, F>(left: &[T], right: &[U], mut f: F) -> Vec<V>
where
    F: FnMut(&T, Option<&U>, usize) -> V,
{
    left.iter()
        .enumerate()
        .map(|(index, item)| f(item, right.get(index), index))
        .collect()
}

/// Random alphanumeric string
pub fn random_str(length: usize) -> String {
    random_str_from(length, DEFAULT_ALPHABET)
}

pub fn random_str_from(length: usize, alphabet: &str) -> String {
    let symbols: Vec<char> = alphabet.chars().collect();
    if symbols.is_empty() {
        return String::new();
    }
    (0..length)
        .map(|_| symbols[fastrand::usize(..symbols.len())])
        .collect()
}

/// Text after the last `.` of a file name
pub fn get_extension(file_name: &str) -> Option<&str> {
    file_name.rfind('.').map(|index| &file_name[index + 1..])
}

/// MIME type guessed from the file extension
pub fn get_content_type(file_name: &str) -> Option<&'static str> {
    let extension = get_extension(file_name)?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "glb" => "model/gltf-binary",
        "gltf" => "model/gltf+json",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        "csv" => "text/csv",
        _ => return None,
    };
    Some(content_type)
}

/// Why an off-chain JSON document could not be loaded
#[derive(Error, Debug)]
pub enum JsonFetchError {
    #[error("Empty URI")]
    EmptyUri,

    #[error("Request to {uri} failed: {source}")]
    Request {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{uri} returned HTTP {status}")]
    Status { uri: String, status: u16 },

    #[error("Invalid JSON at {uri}: {source}")]
    Decode {
        uri: String,
        #[source]
        source: reqwest::Error,
    },
}

/// GET `uri` and decode its body as JSON
pub async fn fetch_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    uri: &str,
) -> Result<T, JsonFetchError> {
    if uri.trim().is_empty() {
        return Err(JsonFetchError::EmptyUri);
    }

    let response = http
        .get(uri)
        .send()
        .await
        .map_err(|source| JsonFetchError::Request {
            uri: uri.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(JsonFetchError::Status {
            uri: uri.to_string(),
            status: status.as_u16(),
        });
    }

    response.json::<T>().await.map_err(|source| JsonFetchError::Decode {
        uri: uri.to_string(),
        source,
    })
}
