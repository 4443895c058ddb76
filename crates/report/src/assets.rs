//! Report templates embedded into the binary at compile time using
//! [`rust-embed`](rust_embed).

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "../../assets/templates/"]
pub(crate) struct Templates;
impl Templates {
    /// Load an embedded template as a string.
    pub(crate) fn load(name: &str) -> Result<String> {
        let file = Self::get(name).ok_or_raise(|| ErrorKind::AssetNotFound(name.to_string()))?;
        String::from_utf8(file.data.into_owned()).or_raise(|| ErrorKind::Template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_load_report_templates() {
        assert!(Templates::load("report.html").unwrap().contains("{{ mb_freed }}"));
        assert!(!Templates::load("report.txt").unwrap().is_empty());
    }

    #[test]
    fn missing_template() {
        let err = Templates::load("nope.html").unwrap_err();
        assert!(matches!(&*err, ErrorKind::AssetNotFound(_)));
    }
}
