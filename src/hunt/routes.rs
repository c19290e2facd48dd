//! Navigable views and their paths.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Registration,
    Dashboard,
    Scanner(String),
    Photo(String),
    Map,
}

impl View {
    /// Resolve a path. Anything unrecognised falls back to registration.
    pub fn parse(path: &str) -> View {
        let segments: Vec<&str> = path
            .trim()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        match segments.as_slice() {
            [] => View::Registration,
            ["dashboard"] => View::Dashboard,
            ["map"] => View::Map,
            ["scanner", id] => View::Scanner(id.to_string()),
            ["photo", id] => View::Photo(id.to_string()),
            _ => View::Registration,
        }
    }

    pub fn path(&self) -> String {
        match self {
            View::Registration => "/".to_string(),
            View::Dashboard => "/dashboard".to_string(),
            View::Map => "/map".to_string(),
            View::Scanner(id) => format!("/scanner/{}", id),
            View::Photo(id) => format!("/photo/{}", id),
        }
    }

    /// Location the view is bound to, if any
    pub fn location_id(&self) -> Option<&str> {
        match self {
            View::Scanner(id) | View::Photo(id) => Some(id),
            _ => None,
        }
    }

    /// Views that use the camera
    pub fn uses_camera(&self) -> bool {
        matches!(self, View::Scanner(_) | View::Photo(_))
    }
}
