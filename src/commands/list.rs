use crate::output::UserOutput;
use envswitch::Parser;
use std::path::PathBuf;

pub fn run_list(parser: &Parser, dir: Option<PathBuf>, out: &dyn UserOutput) -> anyhow::Result<()> {
    let dirs: Vec<PathBuf> = match dir {
        Some(dir) => vec![dir],
        None => parser
            .search_paths()
            .iter()
            .filter(|path| path.is_dir())
            .cloned()
            .collect(),
    };

    let mut found = 0;
    for dir in dirs {
        let environments = parser.list_environments(&dir)?;
        if environments.is_empty() {
            continue;
        }

        out.status(&format!("{}:", dir.display()));
        for env in environments {
            found += 1;
            let mut line = format!("  {} ({} services)", env.name, env.services.len());
            if !env.description.is_empty() {
                line.push_str(&format!(" - {}", env.description));
            }
            out.status(&line);
        }
    }

    if found == 0 {
        out.warning("No environments found");
    }
    Ok(())
}
