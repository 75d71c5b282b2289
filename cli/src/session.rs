//! Session token persistence under `~/.tasklane/session`.

use anyhow::{anyhow, Context};
use std::fs;
use std::path::PathBuf;

pub fn session_file() -> anyhow::Result<PathBuf> {
    let home = home::home_dir().ok_or_else(|| anyhow!("could not determine home directory"))?;
    Ok(home.join(".tasklane").join("session"))
}

pub fn load_token() -> anyhow::Result<Option<String>> {
    let path = session_file()?;
    match fs::read_to_string(&path) {
        Ok(contents) => {
            let token = contents.trim().to_string();
            Ok(if token.is_empty() { None } else { Some(token) })
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
    }
}

pub fn store_token(token: &str) -> anyhow::Result<()> {
    let path = session_file()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&path, token).with_context(|| format!("writing {}", path.display()))?;

    // The token is a bearer credential, keep it private to the user.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("restricting {}", path.display()))?;
    }

    Ok(())
}

pub fn clear_token() -> anyhow::Result<()> {
    let path = session_file()?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("removing {}", path.display())),
    }
}
