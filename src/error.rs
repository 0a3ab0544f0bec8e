use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid map config: {0}")]
    InvalidConfig(String),
    #[error("fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: String },
    #[error("fetch of {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("could not read file {name}: {reason}")]
    FileRead { name: String, reason: String },
    #[error("required element #{0} is missing from the page")]
    MissingElement(&'static str),
    #[error("browser call failed: {0}")]
    Js(String),
    #[error("no browser window available")]
    NoWindow,
}

pub type MapResult<T> = Result<T, MapError>;
