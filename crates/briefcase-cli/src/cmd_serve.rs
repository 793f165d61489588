use std::path::{Path, PathBuf};

use briefcase_git::discover::default_search_roots;
use briefcase_serve::{ServeConfig, ServiceConfig};

/// Handler environment for `cwd`. Extra roots are scanned after the home defaults.
pub fn service_config(cwd: &Path, home: Option<PathBuf>, extra_roots: &[PathBuf]) -> ServiceConfig {
    let mut search_roots = home.as_deref().map(default_search_roots).unwrap_or_default();
    for root in extra_roots {
        if !search_roots.contains(root) {
            search_roots.push(root.clone());
        }
    }
    ServiceConfig {
        default_cwd: cwd.to_path_buf(),
        home_dir: home,
        search_roots,
    }
}

pub fn execute(cwd: &Path, bind: &str, port: u16, search_roots: &[PathBuf]) -> anyhow::Result<()> {
    let service = service_config(cwd, dirs::home_dir(), search_roots);
    let config = ServeConfig {
        bind: bind.to_string(),
        port,
    };
    tracing::info!(cwd = %cwd.display(), roots = service.search_roots.len(), "starting server");
    tokio::runtime::Runtime::new()?.block_on(briefcase_serve::serve(service, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_roots_follow_home_defaults() {
        let home = PathBuf::from("/home/dev");
        let extra = vec![PathBuf::from("/srv/src"), PathBuf::from("/home/dev/Code")];
        let config = service_config(Path::new("/work"), Some(home), &extra);

        assert_eq!(config.search_roots.len(), 6);
        assert_eq!(config.search_roots[0], PathBuf::from("/home/dev/Documents"));
        assert_eq!(config.search_roots[5], PathBuf::from("/srv/src"));
        assert_eq!(config.default_cwd, PathBuf::from("/work"));
    }

    #[test]
    fn no_home_means_only_extra_roots() {
        let config = service_config(Path::new("/work"), None, &[PathBuf::from("/srv/src")]);
        assert_eq!(config.search_roots, vec![PathBuf::from("/srv/src")]);
        assert!(config.home_dir.is_none());
    }
}
