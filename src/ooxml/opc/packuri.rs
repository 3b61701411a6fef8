/// The PackURI value type: the name of a part inside an OPC package.
///
/// PackURIs always begin with a forward slash and use forward slashes as path
/// separators. Relationship targets are stored relative to the directory of the
/// source part, so most of this type is about translating between the absolute
/// and the relative form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/ppt/slides/slide1.xml")
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string.
    ///
    /// Fails if the URI doesn't start with a forward slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Resolve a relationship target (like "../slideLayouts/slideLayout1.xml")
    /// against the directory of its source part (like "/ppt/slides").
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        // Absolute targets ignore the base
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };

        let mut segments: Vec<&str> = Vec::new();
        for segment in joined.split('/') {
            match segment {
                "" | "." => {},
                ".." => {
                    segments.pop();
                },
                other => segments.push(other),
            }
        }

        Self::new(format!("/{}", segments.join("/")))
    }

    /// Directory portion of this PackURI, e.g. "/ppt/slides" for
    /// "/ppt/slides/slide1.xml". The package pseudo-partname "/" maps to "/".
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Filename portion, e.g. "slide1.xml". Empty for "/".
    pub fn filename(&self) -> &str {
        self.uri
            .rfind('/')
            .map(|pos| &self.uri[pos + 1..])
            .unwrap_or("")
    }

    /// Extension without the leading period, e.g. "xml".
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        filename
            .rfind('.')
            .map(|pos| &filename[pos + 1..])
            .unwrap_or("")
    }

    /// Numeric suffix of tuple partnames, e.g. 21 for "/ppt/slides/slide21.xml".
    ///
    /// Returns `None` for singleton partnames such as "/ppt/presentation.xml".
    pub fn idx(&self) -> Option<u32> {
        let filename = self.filename();
        let stem = filename
            .rfind('.')
            .map(|pos| &filename[..pos])
            .unwrap_or(filename);
        let digits = stem
            .bytes()
            .rev()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 || digits == stem.len() {
            return None;
        }
        atoi_simd::parse::<u32>(&stem.as_bytes()[stem.len() - digits..]).ok()
    }

    /// ZIP member name: the URI without its leading slash.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Reference to this part relative to `base_uri`, as written into a `.rels` file.
    ///
    /// For "/ppt/slideLayouts/slideLayout1.xml" and base "/ppt/slides" this
    /// is "../slideLayouts/slideLayout1.xml".
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();
        let common = from
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<&str> = vec![".."; from.len() - common];
        parts.extend_from_slice(&to[common..]);
        parts.join("/")
    }

    /// PackURI of the `.rels` part holding this part's relationships.
    ///
    /// "/ppt/_rels/presentation.xml.rels" for "/ppt/presentation.xml",
    /// "/_rels/.rels" for the package itself.
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        let base_uri = self.base_uri();
        let rels_uri = if base_uri == "/" {
            format!("/_rels/{}.rels", self.filename())
        } else {
            format!("{}/_rels/{}.rels", base_uri, self.filename())
        };
        Self::new(rels_uri)
    }

    /// Get the full URI string.
    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

/// The URI for the [Content_Types].xml part
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packuri_new() {
        assert!(PackURI::new("/ppt/presentation.xml").is_ok());
        assert!(PackURI::new("ppt/presentation.xml").is_err());
    }

    #[test]
    fn test_components() {
        let uri = PackURI::new("/ppt/media/image12.jpeg").unwrap();
        assert_eq!(uri.base_uri(), "/ppt/media");
        assert_eq!(uri.filename(), "image12.jpeg");
        assert_eq!(uri.ext(), "jpeg");
        assert_eq!(uri.idx(), Some(12));
        assert_eq!(uri.membername(), "ppt/media/image12.jpeg");

        let root = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(root.base_uri(), "/");
        assert_eq!(root.filename(), "");
        assert_eq!(root.membername(), "");
    }

    #[test]
    fn test_idx_singleton() {
        assert_eq!(PackURI::new("/ppt/presentation.xml").unwrap().idx(), None);
        assert_eq!(PackURI::new("/ppt/123.xml").unwrap().idx(), None);
    }

    #[test]
    fn test_from_rel_ref() {
        let uri = PackURI::from_rel_ref("/ppt/slides", "../slideLayouts/slideLayout1.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/slideLayouts/slideLayout1.xml");

        let uri = PackURI::from_rel_ref("/", "ppt/presentation.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/presentation.xml");

        let uri = PackURI::from_rel_ref("/ppt/slides", "/ppt/media/image1.png").unwrap();
        assert_eq!(uri.as_str(), "/ppt/media/image1.png");
    }

    #[test]
    fn test_relative_ref() {
        let layout = PackURI::new("/ppt/slideLayouts/slideLayout1.xml").unwrap();
        assert_eq!(layout.relative_ref("/ppt/slides"), "../slideLayouts/slideLayout1.xml");

        let slide = PackURI::new("/ppt/slides/slide3.xml").unwrap();
        assert_eq!(slide.relative_ref("/ppt"), "slides/slide3.xml");
        assert_eq!(slide.relative_ref("/"), "ppt/slides/slide3.xml");
    }

    #[test]
    fn test_relative_ref_round_trips() {
        let image = PackURI::new("/ppt/media/image4.png").unwrap();
        let base = "/ppt/slides";
        let back = PackURI::from_rel_ref(base, &image.relative_ref(base)).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn test_rels_uri() {
        let pres = PackURI::new("/ppt/presentation.xml").unwrap();
        assert_eq!(pres.rels_uri().unwrap().as_str(), "/ppt/_rels/presentation.xml.rels");

        let root = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(root.rels_uri().unwrap().as_str(), "/_rels/.rels");
    }
}
