//! Platform naming for pre-compiled extension artifacts
//!
//! Distributed extensions are laid out per platform as `$OS-$CPU`
//! directories, e.g. `linux-x86_64/hello0.so`.

use crate::error::ArtifactError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Macos,
    Linux,
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::Macos => write!(f, "macos"),
            Os::Linux => write!(f, "linux"),
            Os::Windows => write!(f, "windows"),
        }
    }
}

impl FromStr for Os {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "macos" => Ok(Os::Macos),
            "linux" => Ok(Os::Linux),
            "windows" => Ok(Os::Windows),
            other => Err(ArtifactError::InvalidOs(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cpu {
    X86_64,
    Aarch64,
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cpu::X86_64 => write!(f, "x86_64"),
            Cpu::Aarch64 => write!(f, "aarch64"),
        }
    }
}

impl FromStr for Cpu {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64" => Ok(Cpu::X86_64),
            "aarch64" => Ok(Cpu::Aarch64),
            other => Err(ArtifactError::InvalidCpu(other.to_string())),
        }
    }
}

/// An operating system and CPU pair an artifact was compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub os: Os,
    pub cpu: Cpu,
}

impl Platform {
    pub fn new(os: Os, cpu: Cpu) -> Self {
        Self { os, cpu }
    }

    /// Detect the platform this binary is running on
    pub fn current() -> Result<Self, ArtifactError> {
        Self::from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    fn from_consts(os: &str, arch: &str) -> Result<Self, ArtifactError> {
        let unsupported = || ArtifactError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };
        let os = os.parse::<Os>().map_err(|_| unsupported())?;
        let cpu = arch.parse::<Cpu>().map_err(|_| unsupported())?;
        Ok(Self { os, cpu })
    }

    /// File suffix of a loadable module on this platform
    pub fn loadable_suffix(&self) -> &'static str {
        match self.os {
            Os::Macos => "dylib",
            Os::Windows => "dll",
            Os::Linux => "so",
        }
    }

    /// Name of the per-platform directory, `$OS-$CPU`
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.os, self.cpu)
    }

    /// Platform part of an npm platform package name, using node's
    /// `process.platform`/`process.arch` spellings (`darwin-arm64`, `linux-x64`)
    pub fn npm_name(&self) -> String {
        let os = match self.os {
            Os::Macos => "darwin",
            Os::Linux => "linux",
            Os::Windows => "windows",
        };
        let cpu = match self.cpu {
            Cpu::X86_64 => "x64",
            Cpu::Aarch64 => "arm64",
        };
        format!("{}-{}", os, cpu)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

impl FromStr for Platform {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let os = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ArtifactError::InvalidPlatformDir(s.to_string()))?
            .parse::<Os>()?;
        let cpu = parts
            .next()
            .ok_or_else(|| ArtifactError::InvalidPlatformDir(s.to_string()))?
            .parse::<Cpu>()?;
        if parts.next().is_some() {
            return Err(ArtifactError::InvalidPlatformDir(s.to_string()));
        }
        Ok(Self { os, cpu })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix() {
        assert_eq!(Platform::new(Os::Linux, Cpu::X86_64).loadable_suffix(), "so");
        assert_eq!(
            Platform::new(Os::Macos, Cpu::Aarch64).loadable_suffix(),
            "dylib"
        );
        assert_eq!(
            Platform::new(Os::Windows, Cpu::X86_64).loadable_suffix(),
            "dll"
        );
    }

    #[test]
    fn test_dir_name_round_trip() {
        let platform: Platform = "macos-aarch64".parse().unwrap();
        assert_eq!(platform, Platform::new(Os::Macos, Cpu::Aarch64));
        assert_eq!(platform.dir_name(), "macos-aarch64");
    }

    #[test]
    fn test_npm_name() {
        assert_eq!(Platform::new(Os::Linux, Cpu::X86_64).npm_name(), "linux-x64");
        assert_eq!(
            Platform::new(Os::Macos, Cpu::Aarch64).npm_name(),
            "darwin-arm64"
        );
        assert_eq!(
            Platform::new(Os::Windows, Cpu::X86_64).npm_name(),
            "windows-x64"
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "freebsd-x86_64".parse::<Platform>(),
            Err(ArtifactError::InvalidOs(os)) if os == "freebsd"
        ));
        assert!(matches!(
            "linux-riscv64".parse::<Platform>(),
            Err(ArtifactError::InvalidCpu(cpu)) if cpu == "riscv64"
        ));
        assert!(matches!(
            "linux".parse::<Platform>(),
            Err(ArtifactError::InvalidPlatformDir(_))
        ));
        assert!(matches!(
            "linux-x86_64-musl".parse::<Platform>(),
            Err(ArtifactError::InvalidPlatformDir(_))
        ));
    }

    #[test]
    fn test_from_consts() {
        let platform = Platform::from_consts("linux", "aarch64").unwrap();
        assert_eq!(platform, Platform::new(Os::Linux, Cpu::Aarch64));

        assert!(matches!(
            Platform::from_consts("linux", "x86"),
            Err(ArtifactError::UnsupportedPlatform { .. })
        ));
    }
}
