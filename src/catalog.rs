//! Qt Linguist `.ts` catalogs: data model, reader, writer and lookup.

mod error;
pub mod language;
mod model;
mod parser;
mod plural;
mod translator;
mod writer;

pub use error::CatalogError;
pub use model::{
    Catalog,
    Context,
    LENGTH_VARIANT_SEPARATOR,
    Location,
    Message,
    MessageKey,
    Translation,
    TranslationState,
    TranslationText,
    primary_variant,
};
pub use parser::{
    load_catalog_file,
    parse_catalog,
};
pub use plural::PluralRule;
pub use translator::{
    Translator,
    TranslatorSet,
    substitute_count,
};
pub use writer::{
    save_catalog_file,
    write_catalog,
};
