use super::share_link::is_document_host;
use url::Url;

/// Fallback name for files served by a document host
const DOCUMENT_HOST_DEFAULT: &str = "book.pdf";

/// Fallback name for everything else
const GENERIC_DEFAULT: &str = "download.pdf";

/// Path segments that are routing, not names
const PLACEHOLDER_NAMES: &[&str] = &["uc", "id", "file"];

const MIN_NAME_CHARS: usize = 3;
const MAX_NAME_CHARS: usize = 200;

/// Fallback display name for an artifact fetched from `url`
pub fn default_name(url: &Url) -> &'static str {
    if is_document_host(url) {
        DOCUMENT_HOST_DEFAULT
    } else {
        GENERIC_DEFAULT
    }
}

/// True for either of the fallback names
pub fn is_default_name(name: &str) -> bool {
    name == DOCUMENT_HOST_DEFAULT || name == GENERIC_DEFAULT
}

/// Makes a display name safe to use as a path component
///
/// Directory parts are dropped, control characters are removed and names
/// made only of dots are rejected.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') || cleaned.contains("..") {
        return None;
    }

    Some(cleaned.chars().take(MAX_NAME_CHARS).collect())
}

/// Reads the filename parameter of a `Content-Disposition` header
///
/// Handles `filename*=UTF-8''...`, quoted and unquoted `filename=` values.
/// The value is percent-decoded.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let extended = header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename*="))
        .map(|value| match value.find("''") {
            Some(index) => &value[index + 2..],
            None => value,
        });

    let plain = || {
        header
            .split(';')
            .map(str::trim)
            .find_map(|part| part.strip_prefix("filename="))
    };

    let raw = extended.or_else(plain)?.trim().trim_matches('"');
    let decoded = urlencoding::decode(raw)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    sanitize_filename(&decoded)
}

/// Last path segment of `url`, when it looks like a real filename
pub fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(segment)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    let plausible = decoded.contains('.')
        && decoded.chars().count() >= MIN_NAME_CHARS
        && !PLACEHOLDER_NAMES.contains(&decoded.to_lowercase().as_str());

    if plausible {
        sanitize_filename(&decoded)
    } else {
        None
    }
}

/// Display name derived from a download link before anything is fetched
///
/// Document-host links never yield a preferred name; their path segments are
/// routing (`/uc`, `/file/d/...`), not filenames.
pub fn preferred_name(download_url: &str) -> Option<String> {
    let url = Url::parse(download_url).ok()?;
    if is_document_host(&url) {
        return None;
    }
    filename_from_url(&url)
}

/// Resolves the MIME type of a stored artifact
///
/// A specific `Content-Type` wins. Generic or missing types fall back to the
/// filename extension.
pub fn mime_for(content_type: Option<&str>, name: &str) -> String {
    if let Some(content_type) = content_type {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        let generic = essence.is_empty()
            || essence == "application/octet-stream"
            || essence == "binary/octet-stream"
            || essence == "application/force-download";
        if !generic {
            return essence;
        }
    }

    let lowered = name.to_lowercase();
    if lowered.ends_with(".pdf") {
        "application/pdf"
    } else if lowered.ends_with(".epub") {
        "application/epub+zip"
    } else if lowered.ends_with(".mobi") {
        "application/x-mobipocket-ebook"
    } else {
        "application/octet-stream"
    }
    .to_string()
}
