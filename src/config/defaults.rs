//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "content".into()
    }

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn footer() -> PathBuf {
        "footer.html".into()
    }

    pub fn stylesheet() -> Option<String> {
        Some("style.css".into())
    }

    pub fn jobs() -> usize {
        0
    }

    pub mod documents {
        pub fn extension() -> String {
            "md".into()
        }

        pub fn output_extension() -> String {
            "html".into()
        }
    }

    pub mod assets {
        /// Passthrough formats: pages, stylesheets, raster and vector images, documents.
        pub fn extensions() -> Vec<String> {
            ["html", "htm", "css", "png", "jpg", "jpeg", "gif", "svg", "webp", "pdf"]
                .into_iter()
                .map(Into::into)
                .collect()
        }
    }

    pub mod converter {
        pub fn command() -> Vec<String> {
            vec!["pandoc".into()]
        }
    }

    pub mod index {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "contents.html".into()
        }

        pub fn title() -> String {
            "Contents".into()
        }

        pub fn exclude() -> Vec<String> {
            vec!["index.html".into()]
        }
    }

    pub mod archive {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "site.tar.zst".into()
        }

        pub fn level() -> i32 {
            3
        }
    }
}
