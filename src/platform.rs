//! Release naming for the comment-checker binary per host platform.

/// Tokens used by the release assets for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub os: &'static str,
    pub arch: &'static str,
    pub ext: ArchiveKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Zip,
}

impl ArchiveKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveKind::TarGz => "tar.gz",
            ArchiveKind::Zip => "zip",
        }
    }
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

const PLATFORMS: &[(&str, PlatformDescriptor)] = &[
    ("darwin-arm64", PlatformDescriptor { os: "darwin", arch: "arm64", ext: ArchiveKind::TarGz }),
    ("darwin-x64", PlatformDescriptor { os: "darwin", arch: "amd64", ext: ArchiveKind::TarGz }),
    ("linux-arm64", PlatformDescriptor { os: "linux", arch: "arm64", ext: ArchiveKind::TarGz }),
    ("linux-x64", PlatformDescriptor { os: "linux", arch: "amd64", ext: ArchiveKind::TarGz }),
    ("win32-x64", PlatformDescriptor { os: "windows", arch: "amd64", ext: ArchiveKind::Zip }),
];

impl PlatformDescriptor {
    /// Look up a platform key such as `linux-x64`.
    pub fn for_key(key: &str) -> Option<Self> {
        PLATFORMS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, descriptor)| *descriptor)
    }

    /// Descriptor for the platform this process runs on.
    pub fn current() -> Option<Self> {
        Self::for_key(&current_platform_key())
    }

    /// `<os>_<arch>.<ext>`, the tail of every release asset name.
    pub fn asset_suffix(&self) -> String {
        format!("{}_{}.{}", self.os, self.arch, self.ext)
    }

    pub fn asset_name(&self, version: &str) -> String {
        format!("comment-checker_v{}_{}", version, self.asset_suffix())
    }
}

/// Host platform key in the `darwin|linux|win32` / `x64|arm64` vocabulary.
pub fn current_platform_key() -> String {
    let os = match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    };
    let arch = match std::env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        other => other,
    };
    format!("{}-{}", os, arch)
}

pub fn binary_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "comment-checker.exe"
    } else {
        "comment-checker"
    }
}
