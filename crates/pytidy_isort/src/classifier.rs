use crate::config::SortOptions;
use crate::constants::{DUNDER_MODULES, FUTURE_MODULE, is_stdlib};
use crate::types::{Bucket, ImportStatement};
use log::trace;
use std::path::Path;

/// Assign `statement` to its output bucket. First matching rule wins.
pub fn classify(statement: &ImportStatement, options: &SortOptions, root: Option<&Path>) -> Bucket {
    let module = statement.module.as_str();
    let top = statement.top_level();

    let bucket = if module == FUTURE_MODULE && !statement.is_relative() {
        Bucket::Future
    } else if statement.is_relative() {
        Bucket::FirstParty
    } else if DUNDER_MODULES.contains(&top) {
        Bucket::DunderBuiltin
    } else if is_stdlib(top) {
        Bucket::StandardLibrary
    } else if is_known(module, &options.known_first_party)
        || root.is_some_and(|root| exists_under_root(root, top))
    {
        Bucket::FirstParty
    } else if is_known(module, &options.known_third_party) {
        Bucket::KnownThirdParty
    } else {
        Bucket::ThirdParty
    };
    trace!("{} -> {:?}", statement.module_spec(), bucket);
    bucket
}

/// `module` is listed, or one of its parent packages is. Names compare exactly.
fn is_known(module: &str, known: &[String]) -> bool {
    known.iter().any(|name| {
        module == name
            || module.strip_prefix(name.as_str()).is_some_and(|rest| rest.starts_with('.'))
    })
}

fn exists_under_root(root: &Path, top: &str) -> bool {
    if top.is_empty() {
        return false;
    }
    [root.to_path_buf(), root.join("src")].iter().any(|base| {
        base.join(top).is_dir()
            || base.join(format!("{top}.py")).is_file()
            || base.join(format!("{top}.pyi")).is_file()
    })
}
