use anyhow::Result;

use crate::catalog::{self, Category, EtfMeta};
use crate::cli::formatters;

pub fn dispatch_catalog(category: Option<&str>, json_output: bool) -> Result<()> {
    let category = match category {
        Some(input) => Some(Category::parse(input).ok_or_else(|| {
            anyhow::anyhow!("unknown category '{}'. Use: japan, foreign, or enhanced", input)
        })?),
        None => None,
    };

    let entries: Vec<&'static EtfMeta> = match category {
        Some(c) => catalog::by_category(c).collect(),
        None => catalog::UNIVERSE.iter().collect(),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("{}", formatters::format_catalog_table(&entries));
    }
    Ok(())
}
