use super::{fail, open_repo, print_json, runtime};
use miette::Result;
use serde::Serialize;
use wheelhouse_core::Config;

/// Deps result for JSON output (locked format: { ok, name, version, extra, dependencies }).
#[derive(Debug, Serialize)]
struct DepsResult<'a> {
    ok: bool,
    name: &'a str,
    version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a str>,
    dependencies: Vec<String>,
}

pub fn run(
    config: &Config,
    name: &str,
    version: &str,
    extra: Option<&str>,
    json: bool,
) -> Result<()> {
    let repo = open_repo(config, json);

    let dependencies: Vec<String> =
        match runtime()?.block_on(repo.get_dependencies(name, version, extra)) {
            Ok(deps) => deps.iter().map(ToString::to_string).collect(),
            Err(e) => fail(&e, json),
        };

    if json {
        return print_json(&DepsResult {
            ok: true,
            name,
            version,
            extra,
            dependencies,
        });
    }

    if dependencies.is_empty() {
        match extra {
            Some(extra) => println!("{name}[{extra}] {version} has no dependencies"),
            None => println!("{name} {version} has no dependencies"),
        }
    }
    for dep in &dependencies {
        println!("{dep}");
    }
    Ok(())
}
