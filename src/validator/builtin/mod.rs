mod checksum;
mod dependency;
mod install;
mod name;
mod target;
mod urls;

use super::Rule;

/// Returns all built-in rules, in the order they run.
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(name::NameRule),
        Box::new(urls::HomepageUrlRule),
        Box::new(urls::SourceUrlRule),
        Box::new(checksum::ChecksumRule),
        Box::new(install::InstallStepsRule),
        Box::new(dependency::DependencyRule),
        Box::new(target::TargetRule),
    ]
}
