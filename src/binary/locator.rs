use std::future::Future;
use std::path::{Path, PathBuf};

use reqwest::Client;
use serde::Deserialize;
use tokio::process::Command;

use crate::config::{Config, FALLBACK_VERSION};
use crate::error::CheckerError;
use crate::platform::{binary_name, ArchiveKind, PlatformDescriptor};

/// npm-style package that may ship the executable alongside the host.
const BUNDLED_PACKAGE_DIR: [&str; 3] = ["node_modules", "@code-yeongyu", "comment-checker"];

/// Lookup and staging strategy behind [`super::BinaryResolver`].
pub trait BinaryLocator: Send + Sync + 'static {
    /// Installed executable (bundled or cached). Must not touch the network.
    fn find_installed(&self) -> Option<PathBuf>;

    /// Fetch and stage the executable. Failures collapse to `None`.
    fn download(&self) -> impl Future<Output = Option<PathBuf>> + Send;
}

/// Finds the checker in a bundled install or the cache dir, or downloads a release.
#[derive(Debug, Clone)]
pub struct ReleaseLocator {
    client: Client,
    cache_dir: PathBuf,
    binary_path: Option<PathBuf>,
    /// Directories that may hold the executable itself (or under `bin/`).
    exe_dirs: Vec<PathBuf>,
    /// Directories that may hold the bundled npm package.
    package_roots: Vec<PathBuf>,
    platform: Option<PlatformDescriptor>,
    version: Option<String>,
    release_base_url: String,
}

impl ReleaseLocator {
    pub fn new(cache_dir: impl Into<PathBuf>, release_base_url: impl Into<String>) -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let (exe_dirs, package_roots) = default_search_roots(exe_dir, std::env::current_dir().ok());

        Self {
            client: Client::new(),
            cache_dir: cache_dir.into(),
            binary_path: None,
            exe_dirs,
            package_roots,
            platform: PlatformDescriptor::current(),
            version: None,
            release_base_url: release_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut locator = Self::new(config.cache_dir.clone(), config.release_base_url.clone());
        locator.binary_path = config.binary_path.clone();
        locator.version = config.version.clone();
        locator
    }

    /// Override the platform (e.g. `None` to simulate an unsupported host).
    pub fn with_platform(mut self, platform: Option<PlatformDescriptor>) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_exe_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.exe_dirs = dirs;
        self
    }

    pub fn with_package_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.package_roots = roots;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cached_binary_path(&self) -> PathBuf {
        self.cache_dir.join(binary_name())
    }

    /// Executable previously staged in the cache dir.
    pub fn cached_binary(&self) -> Option<PathBuf> {
        let path = self.cached_binary_path();
        path.is_file().then_some(path)
    }

    /// Explicit override, then the executable next to this program, then a bundled package.
    pub fn bundled_binary(&self) -> Option<PathBuf> {
        if let Some(path) = &self.binary_path {
            if path.is_file() {
                return Some(path.clone());
            }
            tracing::warn!(path = %path.display(), "Configured comment-checker path does not exist");
        }

        let beside_exe = self
            .exe_dirs
            .iter()
            .flat_map(|dir| [dir.join(binary_name()), dir.join("bin").join(binary_name())]);
        let packaged = self
            .package_roots
            .iter()
            .map(|root| bundled_package_dir(root).join("bin").join(binary_name()));

        beside_exe.chain(packaged).find(|candidate| candidate.is_file())
    }

    /// Explicit override, else the bundled package's `package.json`, else the fallback.
    pub fn version(&self) -> String {
        if let Some(version) = &self.version {
            return version.clone();
        }
        self.package_roots
            .iter()
            .find_map(|root| read_package_version(&bundled_package_dir(root)))
            .unwrap_or_else(|| FALLBACK_VERSION.to_string())
    }

    pub fn asset_url(&self, platform: &PlatformDescriptor) -> String {
        let version = self.version();
        format!(
            "{}/v{}/{}",
            self.release_base_url,
            version,
            platform.asset_name(&version)
        )
    }

    /// Download, extract and mark the release executable. Skips the network
    /// entirely when the executable is already in the cache dir.
    pub async fn try_download(&self) -> Result<PathBuf, CheckerError> {
        let platform = self
            .platform
            .ok_or_else(|| CheckerError::UnsupportedPlatform(crate::platform::current_platform_key()))?;

        tokio::fs::create_dir_all(&self.cache_dir).await?;

        let target = self.cached_binary_path();
        if target.is_file() {
            tracing::debug!(path = %target.display(), "Checker already cached, skipping download");
            return Ok(target);
        }

        let url = self.asset_url(&platform);
        tracing::debug!(%url, "Downloading comment-checker");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CheckerError::HttpStatus {
                url,
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await?;

        let archive_path = self.cache_dir.join(platform.asset_name(&self.version()));
        tokio::fs::write(&archive_path, &bytes).await?;

        extract_archive(&archive_path, &self.cache_dir, platform.ext).await?;

        if let Err(e) = tokio::fs::remove_file(&archive_path).await {
            tracing::debug!(path = %archive_path.display(), error = %e, "Could not remove archive");
        }

        if !target.is_file() {
            return Err(CheckerError::MissingExecutable(target));
        }
        mark_executable(&target).await?;

        tracing::debug!(path = %target.display(), "comment-checker ready");
        Ok(target)
    }
}

impl BinaryLocator for ReleaseLocator {
    fn find_installed(&self) -> Option<PathBuf> {
        self.bundled_binary().or_else(|| self.cached_binary())
    }

    async fn download(&self) -> Option<PathBuf> {
        match self.try_download().await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "comment-checker unavailable, disabling checks");
                None
            }
        }
    }
}

/// The working directory only ever contributes the npm package location;
/// a loose `comment-checker` in a project tree is never trusted.
fn default_search_roots(exe_dir: Option<PathBuf>, cwd: Option<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let exe_dirs: Vec<PathBuf> = exe_dir.into_iter().collect();
    let mut package_roots = exe_dirs.clone();
    package_roots.extend(cwd.filter(|dir| !exe_dirs.contains(dir)));
    (exe_dirs, package_roots)
}

fn bundled_package_dir(root: &Path) -> PathBuf {
    BUNDLED_PACKAGE_DIR
        .iter()
        .fold(root.to_path_buf(), |dir, part| dir.join(part))
}

#[derive(Deserialize)]
struct PackageMetadata {
    version: Option<String>,
}

fn read_package_version(package_dir: &Path) -> Option<String> {
    let text = std::fs::read_to_string(package_dir.join("package.json")).ok()?;
    serde_json::from_str::<PackageMetadata>(&text)
        .ok()?
        .version
        .filter(|v| !v.trim().is_empty())
}

async fn extract_archive(archive: &Path, dest: &Path, kind: ArchiveKind) -> Result<(), CheckerError> {
    let (tool, mut cmd) = match kind {
        ArchiveKind::TarGz => {
            let mut cmd = Command::new("tar");
            cmd.arg("-xzf").arg(archive).arg("-C").arg(dest);
            ("tar", cmd)
        }
        ArchiveKind::Zip if cfg!(windows) => {
            let mut cmd = Command::new("powershell");
            cmd.arg("-NoProfile").arg("-Command").arg(format!(
                "Expand-Archive -Path '{}' -DestinationPath '{}' -Force",
                archive.display(),
                dest.display()
            ));
            ("powershell", cmd)
        }
        ArchiveKind::Zip => {
            let mut cmd = Command::new("unzip");
            cmd.arg("-o").arg(archive).arg("-d").arg(dest);
            ("unzip", cmd)
        }
    };

    let output = cmd.output().await?;
    if !output.status.success() {
        return Err(CheckerError::Extraction {
            tool,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(unix)]
async fn mark_executable(path: &Path) -> Result<(), CheckerError> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn mark_executable(_path: &Path) -> Result<(), CheckerError> {
    Ok(())
}
