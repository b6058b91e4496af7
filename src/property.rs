//! Property names and their owning domains.
//!
//! Property maps are open-ended: a source file may declare any name. The
//! names the collection has to reason about (the `Parent` link and the
//! reserved platform / engine fields) are known variants of [`Property`];
//! everything else is carried as [`Property::Other`].

use serde::{Serialize, Serializer};
use std::fmt;

bitflags::bitflags! {
    /// Which part of the data model owns a property.
    ///
    /// `PLATFORM` and `ENGINE` properties live exclusively in the record
    /// store and are rejected inside user agent entries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyDomain: u8 {
        const META     = 1 << 0;
        const BROWSER  = 1 << 1;
        const PLATFORM = 1 << 2;
        const ENGINE   = 1 << 3;
        const DEVICE   = 1 << 4;
    }
}

macro_rules! known_properties {
    ($( $variant:ident => $name:literal in $domain:ident, )*) => {
        /// A property name.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Property {
            $( $variant, )*
            Other(String),
        }

        impl Property {
            pub fn parse(name: &str) -> Self {
                match name {
                    $( $name => Property::$variant, )*
                    other => Property::Other(other.to_string()),
                }
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $( Property::$variant => $name, )*
                    Property::Other(name) => name.as_str(),
                }
            }

            /// Unknown names belong to no domain.
            pub fn domain(&self) -> PropertyDomain {
                match self {
                    $( Property::$variant => PropertyDomain::$domain, )*
                    Property::Other(_) => PropertyDomain::empty(),
                }
            }
        }
    };
}

known_properties! {
    Parent => "Parent" in META,
    Comment => "Comment" in META,

    Browser => "Browser" in BROWSER,
    BrowserType => "Browser_Type" in BROWSER,
    BrowserBits => "Browser_Bits" in BROWSER,
    BrowserMaker => "Browser_Maker" in BROWSER,
    BrowserModus => "Browser_Modus" in BROWSER,
    Version => "Version" in BROWSER,
    MajorVer => "MajorVer" in BROWSER,
    MinorVer => "MinorVer" in BROWSER,
    Alpha => "Alpha" in BROWSER,
    Beta => "Beta" in BROWSER,
    Win16 => "Win16" in BROWSER,
    Win32 => "Win32" in BROWSER,
    Win64 => "Win64" in BROWSER,
    Frames => "Frames" in BROWSER,
    IFrames => "IFrames" in BROWSER,
    Tables => "Tables" in BROWSER,
    Cookies => "Cookies" in BROWSER,
    BackgroundSounds => "BackgroundSounds" in BROWSER,
    JavaScript => "JavaScript" in BROWSER,
    VBScript => "VBScript" in BROWSER,
    JavaApplets => "JavaApplets" in BROWSER,
    ActiveXControls => "ActiveXControls" in BROWSER,
    IsMobileDevice => "isMobileDevice" in BROWSER,
    IsTablet => "isTablet" in BROWSER,
    IsSyndicationReader => "isSyndicationReader" in BROWSER,
    Crawler => "Crawler" in BROWSER,
    CssVersion => "CssVersion" in BROWSER,
    AolVersion => "AolVersion" in BROWSER,

    Platform => "Platform" in PLATFORM,
    PlatformVersion => "Platform_Version" in PLATFORM,
    PlatformDescription => "Platform_Description" in PLATFORM,
    PlatformBits => "Platform_Bits" in PLATFORM,
    PlatformMaker => "Platform_Maker" in PLATFORM,

    DeviceName => "Device_Name" in DEVICE,
    DeviceMaker => "Device_Maker" in DEVICE,
    DeviceType => "Device_Type" in DEVICE,
    DevicePointingMethod => "Device_Pointing_Method" in DEVICE,
    DeviceCodeName => "Device_Code_Name" in DEVICE,
    DeviceBrandName => "Device_Brand_Name" in DEVICE,

    RenderingEngineName => "RenderingEngine_Name" in ENGINE,
    RenderingEngineVersion => "RenderingEngine_Version" in ENGINE,
    RenderingEngineDescription => "RenderingEngine_Description" in ENGINE,
    RenderingEngineMaker => "RenderingEngine_Maker" in ENGINE,
}

impl From<&str> for Property {
    fn from(name: &str) -> Self {
        Property::parse(name)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Property {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_round_trip() {
        for name in ["Parent", "Platform_Bits", "RenderingEngine_Maker", "isMobileDevice"] {
            let property = Property::parse(name);
            assert!(!matches!(property, Property::Other(_)), "{name} should be a known property");
            assert_eq!(property.as_str(), name);
        }
    }

    #[test]
    fn unknown_names_have_no_domain() {
        let property = Property::parse("Platform_Codename");
        assert_eq!(property, Property::Other("Platform_Codename".to_string()));
        assert!(property.domain().is_empty());
    }

    #[test]
    fn reserved_domains() {
        assert_eq!(Property::PlatformVersion.domain(), PropertyDomain::PLATFORM);
        assert_eq!(Property::RenderingEngineVersion.domain(), PropertyDomain::ENGINE);
        // browser version is not a platform field
        assert_eq!(Property::Version.domain(), PropertyDomain::BROWSER);
        assert_eq!(Property::Win64.domain(), PropertyDomain::BROWSER);
    }
}
