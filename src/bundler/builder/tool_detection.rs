//! Host and JDK detection plus packaging tool lookup.
//!
//! The host environment is detected once per invocation and then passed around
//! by reference. Everything that depends on the operating system or the JDK
//! version (backend validation, defect detection, tool lookup) reads it from
//! here instead of asking the system again.

use crate::bundler::error::{Error, Result};
use crate::bundler::utils::process;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Operating system family of the build host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl HostOs {
    /// The OS this binary was compiled for.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Other,
        }
    }

    /// File name of an executable on this OS.
    pub fn executable(&self, tool: &str) -> String {
        match self {
            Self::Windows => format!("{tool}.exe"),
            _ => tool.to_string(),
        }
    }
}

/// A JDK version string such as `1.8.0_92` or `9.0.4`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JavaVersion(String);

impl JavaVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_java8(&self) -> bool {
        self.0.starts_with("1.8")
    }

    pub fn is_java9(&self) -> bool {
        self.0.starts_with("1.9") || self.0 == "9" || self.0.starts_with("9.") || self.0.starts_with("9-")
    }

    /// Update number: the leading digits after the first `_`.
    pub fn update_number(&self) -> Option<u32> {
        let (_, update) = self.0.split_once('_')?;
        let digits: String = update.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    }

    /// Java 8 with at least the given update.
    pub fn is_java8_at_least(&self, update: u32) -> bool {
        self.is_java8() && self.update_number().is_some_and(|u| u >= update)
    }

    /// Java 8 with an update below the given one.
    ///
    /// An unknown update number counts as old.
    pub fn is_java8_below(&self, update: u32) -> bool {
        self.is_java8() && self.update_number().is_none_or(|u| u < update)
    }
}

impl std::fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Facts about the build host relevant to native bundling.
#[derive(Clone, Debug)]
pub struct HostEnvironment {
    pub os: HostOs,
    pub java_version: Option<JavaVersion>,
    pub java_home: Option<PathBuf>,
}

impl HostEnvironment {
    /// An environment without any JDK information.
    pub fn new(os: HostOs) -> Self {
        Self {
            os,
            java_version: None,
            java_home: None,
        }
    }

    /// Sets the JDK version.
    pub fn with_java_version(mut self, version: impl Into<String>) -> Self {
        self.java_version = Some(JavaVersion::new(version));
        self
    }

    /// Sets the JDK home.
    pub fn with_java_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.java_home = Some(home.into());
        self
    }

    /// Probes the host by asking `java` for its system properties.
    ///
    /// A missing `java` is not an error; version-dependent workarounds simply
    /// do not trigger. `pinned_version` wins over the detected version.
    pub async fn detect(pinned_version: Option<&str>) -> Self {
        let mut env = Self::new(HostOs::current());

        let java = match std::env::var_os("JAVA_HOME") {
            Some(home) => PathBuf::from(home)
                .join("bin")
                .join(env.os.executable("java")),
            None => PathBuf::from("java"),
        };
        let mut cmd = Command::new(&java);
        cmd.args(["-XshowSettings:properties", "-version"]);

        match process::capture(cmd, None).await {
            Ok(output) if output.success() => {
                // Settings are printed to stderr.
                let lines = output.stderr.iter().chain(output.stdout.iter());
                for line in lines {
                    if let Some(version) = property_value(line, "java.version") {
                        env.java_version = Some(JavaVersion::new(version));
                    } else if let Some(home) = property_value(line, "java.home") {
                        env.java_home = Some(PathBuf::from(home));
                    }
                }
            }
            Ok(output) => log::debug!(
                "{} exited with {} while probing JDK settings",
                java.display(),
                output.code
            ),
            Err(e) => log::debug!("Couldn't read JDK settings: {e}"),
        }

        if let Some(pinned) = pinned_version {
            env.java_version = Some(JavaVersion::new(pinned));
        }

        match &env.java_version {
            Some(version) => log::debug!("Detected JDK {version} on {:?}", env.os),
            None => log::debug!("No JDK version detected on {:?}", env.os),
        }
        env
    }

    /// Locates a JDK tool such as `javapackager` or `jarsigner`.
    ///
    /// With `from_path` the tool is looked up on `PATH`; otherwise it is
    /// expected in `<java.home>/../bin`, which is where the JDK keeps it when
    /// `java.home` points at the bundled JRE.
    pub fn locate_tool(&self, tool: &str, from_path: bool) -> Result<PathBuf> {
        if from_path {
            return which::which(tool).map_err(|e| {
                Error::GenericError(format!("couldn't find {tool} on PATH: {e}"))
            });
        }
        let home = self.java_home.as_deref().ok_or_else(|| {
            Error::GenericError(format!(
                "couldn't locate {tool}: java.home is unknown, enable use_environment_relative_executables"
            ))
        })?;
        let candidate = jdk_bin(home).join(self.os.executable(tool));
        if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(Error::GenericError(format!(
                "couldn't find {tool} at {}",
                candidate.display()
            )))
        }
    }
}

fn jdk_bin(java_home: &Path) -> PathBuf {
    match java_home.parent() {
        Some(parent) => parent.join("bin"),
        None => java_home.join("bin"),
    }
}

fn property_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (name, value) = line.trim().split_once('=')?;
    (name.trim() == key).then(|| value.trim())
}
