/// Provides the PackURI value type and utilities for working with package URIs.
///
/// A PackURI represents a part name within an OPC package, following the URI
/// format defined by the Open Packaging Conventions specification. PackURIs
/// always begin with a forward slash and use forward slashes as separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/ppt/presentation.xml")
    uri: String,
}

/// The pseudo-partname of the package itself.
pub const PACKAGE_URI: &str = "/";

/// Partname of the content types stream.
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

impl PackURI {
    /// Create a new PackURI from a string.
    ///
    /// # Arguments
    /// * `uri` - The URI string, which must begin with a forward slash
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Create a PackURI from a relative reference and a base URI.
    ///
    /// This translates a relative reference (like "../slideLayouts/slideLayout1.xml")
    /// onto a base URI (like "/ppt/slides") to produce an absolute PackURI.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        if relative_ref.starts_with('/') {
            return Self::new(relative_ref);
        }
        let joined = if base_uri == "/" {
            format!("/{}", relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(Self::normalize_path(&joined))
    }

    /// Resolve "." and ".." segments in a slash-separated path.
    fn normalize_path(path: &str) -> String {
        let mut segments: Vec<&str> = Vec::new();
        for seg in path.split('/') {
            match seg {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        format!("/{}", segments.join("/"))
    }

    /// Get the base URI (directory portion) of this PackURI.
    ///
    /// For example, "/ppt/slides" for "/ppt/slides/slide1.xml".
    pub fn base_uri(&self) -> &str {
        if self.uri == "/" {
            return "/";
        }
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion of this PackURI.
    ///
    /// For example, "slide1.xml" for "/ppt/slides/slide1.xml".
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Get the ZIP member name for this PackURI (no leading slash).
    #[inline]
    pub fn membername(&self) -> &str {
        self.uri.trim_start_matches('/')
    }

    /// Get the PackURI of the relationships part corresponding to this part.
    ///
    /// For "/ppt/presentation.xml" this is "/ppt/_rels/presentation.xml.rels";
    /// for the package itself it is "/_rels/.rels".
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        let base = self.base_uri();
        let rels_name = format!("{}.rels", self.filename());
        if base == "/" {
            PackURI::new(format!("/_rels/{}", rels_name))
        } else {
            PackURI::new(format!("{}/_rels/{}", base, rels_name))
        }
    }

    /// Compute the relative reference to this part from a base directory URI.
    ///
    /// Used when writing relationship targets, e.g. the layout target
    /// "../slideLayouts/slideLayout2.xml" from the "/ppt/slides" base.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        let base_segs: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let uri_segs: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();

        let mut common = 0;
        while common < base_segs.len()
            && common + 1 < uri_segs.len()
            && base_segs[common] == uri_segs[common]
        {
            common += 1;
        }

        let mut parts: Vec<&str> = Vec::new();
        for _ in common..base_segs.len() {
            parts.push("..");
        }
        parts.extend(&uri_segs[common..]);
        parts.join("/")
    }

    /// Get the URI as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_uri() {
        assert!(PackURI::new("ppt/presentation.xml").is_err());
    }

    #[test]
    fn resolves_relative_refs() {
        let uri = PackURI::from_rel_ref("/ppt/slides", "../slideLayouts/slideLayout1.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/slideLayouts/slideLayout1.xml");

        let uri = PackURI::from_rel_ref("/", "ppt/presentation.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/presentation.xml");

        let uri = PackURI::from_rel_ref("/ppt", "slideMasters/slideMaster1.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/slideMasters/slideMaster1.xml");
    }

    #[test]
    fn rels_uri_for_part_and_package() {
        let pres = PackURI::new("/ppt/presentation.xml").unwrap();
        assert_eq!(
            pres.rels_uri().unwrap().as_str(),
            "/ppt/_rels/presentation.xml.rels"
        );

        let pkg = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(pkg.rels_uri().unwrap().as_str(), "/_rels/.rels");
    }

    #[test]
    fn relative_ref_walks_up() {
        let layout = PackURI::new("/ppt/slideLayouts/slideLayout2.xml").unwrap();
        assert_eq!(
            layout.relative_ref("/ppt/slides"),
            "../slideLayouts/slideLayout2.xml"
        );
        let slide = PackURI::new("/ppt/slides/slide3.xml").unwrap();
        assert_eq!(slide.relative_ref("/ppt"), "slides/slide3.xml");
    }

    #[test]
    fn filename_and_base() {
        let uri = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        assert_eq!(uri.filename(), "slide1.xml");
        assert_eq!(uri.base_uri(), "/ppt/slides");
        assert_eq!(uri.membername(), "ppt/slides/slide1.xml");
    }
}
