// Platform capability detection for BLE advertising
//
// Hardware broadcast (peripheral mode) is only available through the Android
// BluetoothLeAdvertiser; every other platform family is refused up front.

/// Platform family the wallet is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Linux,
    Macos,
    Windows,
    Unknown,
}

impl Platform {
    /// Detect the platform family at compile time
    pub fn current() -> Self {
        #[cfg(target_os = "android")]
        {
            Platform::Android
        }
        #[cfg(target_os = "ios")]
        {
            Platform::Ios
        }
        #[cfg(target_os = "linux")]
        {
            Platform::Linux
        }
        #[cfg(target_os = "macos")]
        {
            Platform::Macos
        }
        #[cfg(target_os = "windows")]
        {
            Platform::Windows
        }
        #[cfg(not(any(
            target_os = "android",
            target_os = "ios",
            target_os = "linux",
            target_os = "macos",
            target_os = "windows"
        )))]
        {
            Platform::Unknown
        }
    }

    /// Whether hardware broadcast is available on this platform family.
    /// A `false` here is permanent; the controller refuses to advertise
    /// without touching the radio.
    pub fn supports_advertising(&self) -> bool {
        matches!(self, Platform::Android)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
            Platform::Linux => "Linux",
            Platform::Macos => "macOS",
            Platform::Windows => "Windows",
            Platform::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
