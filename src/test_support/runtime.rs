use anyhow::{Result, bail};
use std::{
    env,
    os::unix::net::UnixStream,
    path::{Path, PathBuf},
    sync::OnceLock,
};

/// Ensure a container runtime socket is available for testcontainers.
///
/// testcontainers talks to the Docker API; when `DOCKER_HOST` is unset we
/// probe the usual Docker and Podman socket locations and point
/// `DOCKER_HOST` at the first one that accepts connections.
///
/// # Errors
/// Returns an error if no Docker/Podman socket can be found.
pub(crate) fn ensure_container_runtime() -> Result<()> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    match INIT.get_or_init(init_container_runtime) {
        Ok(()) => Ok(()),
        Err(message) => bail!("{message}"),
    }
}

fn init_container_runtime() -> Result<(), String> {
    if env::var("DOCKER_HOST").is_ok() {
        return Ok(());
    }

    if socket_connectable(Path::new("/var/run/docker.sock")) {
        return Ok(());
    }

    if let Some(path) = podman_socket() {
        env::set_var("DOCKER_HOST", format!("unix://{}", path.display()));
        return Ok(());
    }

    Err(
        "no container runtime socket found; start the Docker daemon, `podman.socket`, \
         or set `DOCKER_HOST`"
            .to_string(),
    )
}

fn socket_connectable(path: &Path) -> bool {
    path.exists() && UnixStream::connect(path).is_ok()
}

fn podman_socket() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(runtime_dir) = env::var("XDG_RUNTIME_DIR") {
        candidates.push(PathBuf::from(runtime_dir).join("podman/podman.sock"));
    }
    candidates.push(PathBuf::from("/run/podman/podman.sock"));
    candidates.push(PathBuf::from("/var/run/podman/podman.sock"));

    candidates.into_iter().find(|path| socket_connectable(path))
}
