//! Tile provider definition and URL building.

/// A named tile provider from the basemap catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Basemap {
    /// Dotted catalog name, e.g. `OpenStreetMap.Mapnik`
    pub name: &'static str,
    /// URL template with `{x}`, `{y}`, `{z}` plus optional `{s}`, `{r}` and named variables
    pub url: &'static str,
    /// Attribution text shown by the renderer
    pub attribution: &'static str,
    /// Maximum zoom served by the provider
    pub max_zoom: u8,
    /// Subdomains substituted for `{s}`
    pub subdomains: &'static [&'static str],
    /// Named template variables, e.g. `("variant", "light_all")`
    pub variables: &'static [(&'static str, &'static str)],
}

impl Basemap {
    /// Build the tile URL template for this provider.
    ///
    /// Provider-level placeholders are filled in: `{s}` takes the first
    /// subdomain, `{r}` (retina suffix) is dropped and named variables take
    /// their catalog values. The `{x}`, `{y}` and `{z}` placeholders are
    /// left for the renderer.
    pub fn build_url(&self) -> String {
        let mut url = self.url.to_string();

        for (key, value) in self.variables {
            url = url.replace(&format!("{{{}}}", key), value);
        }

        if let Some(first) = self.subdomains.first() {
            url = url.replace("{s}", first);
        }

        url.replace("{r}", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_fills_provider_placeholders() {
        let basemap = Basemap {
            name: "Test.Light",
            url: "https://{s}.example.com/{variant}/{z}/{x}/{y}{r}.png",
            attribution: "test",
            max_zoom: 19,
            subdomains: &["a", "b"],
            variables: &[("variant", "light")],
        };

        assert_eq!(
            basemap.build_url(),
            "https://a.example.com/light/{z}/{x}/{y}.png"
        );
    }

    #[test]
    fn test_build_url_without_placeholders_is_unchanged() {
        let basemap = Basemap {
            name: "Test.Plain",
            url: "https://tile.example.com/{z}/{x}/{y}.png",
            attribution: "test",
            max_zoom: 19,
            subdomains: &[],
            variables: &[],
        };

        assert_eq!(basemap.build_url(), basemap.url);
    }
}
