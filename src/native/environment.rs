//! The host properties that the analyzed program observes through
//! `System.initProperties`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The values of the environment-dependent system properties, as seen by the
/// analyzed program.
///
/// Properties that are [`None`] are not defined for the analyzed program.
/// This is constructed once, when the engine is configured, and is read-only
/// afterward.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentConfig {
    pub os_name:                 Option<String>,
    pub os_version:              Option<String>,
    pub os_arch:                 Option<String>,
    pub file_separator:          Option<String>,
    pub path_separator:          Option<String>,
    pub line_separator:          Option<String>,
    pub user_language:           Option<String>,
    pub user_script:             Option<String>,
    pub user_country:            Option<String>,
    pub user_variant:            Option<String>,
    pub file_encoding:           Option<String>,
    pub sun_jnu_encoding:        Option<String>,
    pub sun_stdout_encoding:     Option<String>,
    pub sun_stderr_encoding:     Option<String>,
    pub sun_io_unicode_encoding: Option<String>,
    pub sun_cpu_isalist:         Option<String>,
    pub sun_cpu_endian:          Option<String>,
    pub http_proxy_host:         Option<String>,
    pub http_proxy_port:         Option<String>,
    pub https_proxy_host:        Option<String>,
    pub https_proxy_port:        Option<String>,
    pub ftp_proxy_host:          Option<String>,
    pub ftp_proxy_port:          Option<String>,
    pub socks_proxy_host:        Option<String>,
    pub socks_proxy_port:        Option<String>,
    pub gopher_proxy_set:        Option<String>,
    pub gopher_proxy_host:       Option<String>,
    pub gopher_proxy_port:       Option<String>,
    pub http_non_proxy_hosts:    Option<String>,
    pub ftp_non_proxy_hosts:     Option<String>,
    pub socks_non_proxy_hosts:   Option<String>,
}

impl EnvironmentConfig {
    /// Constructs an environment in which no property is defined.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs the environment of the host the engine runs on.
    ///
    /// The locale is read from the `LANG` variable, and proxies from the
    /// conventional `*_proxy` variables.
    #[must_use]
    pub fn from_host() -> Self {
        let (language, country) = std::env::var("LANG")
            .ok()
            .map(|lang| parse_locale(&lang))
            .unwrap_or_default();
        let proxy = |variable: &str| {
            std::env::var(variable)
                .or_else(|_| std::env::var(variable.to_uppercase()))
                .ok()
                .and_then(|url| split_proxy(&url))
        };
        let (http_proxy_host, http_proxy_port) = proxy("http_proxy").unzip();
        let (https_proxy_host, https_proxy_port) = proxy("https_proxy").unzip();
        let (ftp_proxy_host, ftp_proxy_port) = proxy("ftp_proxy").unzip();
        let non_proxy_hosts = std::env::var("no_proxy")
            .ok()
            .map(|hosts| hosts.split(',').map(str::trim).collect::<Vec<_>>().join("|"));

        Self {
            os_name: Some(java_os_name(std::env::consts::OS)),
            os_arch: Some(std::env::consts::ARCH.to_string()),
            file_separator: Some(std::path::MAIN_SEPARATOR.to_string()),
            path_separator: Some(if cfg!(windows) { ";" } else { ":" }.to_string()),
            line_separator: Some(if cfg!(windows) { "\r\n" } else { "\n" }.to_string()),
            user_language: language,
            user_country: country,
            file_encoding: Some("UTF-8".to_string()),
            sun_jnu_encoding: Some("UTF-8".to_string()),
            sun_io_unicode_encoding: Some(
                if cfg!(target_endian = "big") {
                    "UnicodeBig"
                } else {
                    "UnicodeLittle"
                }
                .to_string(),
            ),
            sun_cpu_endian: Some(
                if cfg!(target_endian = "big") {
                    "big"
                } else {
                    "little"
                }
                .to_string(),
            ),
            http_proxy_host,
            http_proxy_port,
            https_proxy_host,
            https_proxy_port,
            ftp_proxy_host,
            ftp_proxy_port,
            http_non_proxy_hosts: non_proxy_hosts.clone(),
            ftp_non_proxy_hosts: non_proxy_hosts,
            ..Self::default()
        }
    }

    /// Gets the defined properties, keyed by their Java property names.
    #[must_use]
    pub fn properties(&self) -> BTreeMap<String, String> {
        let entries = [
            ("os.name", &self.os_name),
            ("os.version", &self.os_version),
            ("os.arch", &self.os_arch),
            ("file.separator", &self.file_separator),
            ("path.separator", &self.path_separator),
            ("line.separator", &self.line_separator),
            ("user.language", &self.user_language),
            ("user.script", &self.user_script),
            ("user.country", &self.user_country),
            ("user.variant", &self.user_variant),
            ("file.encoding", &self.file_encoding),
            ("sun.jnu.encoding", &self.sun_jnu_encoding),
            ("sun.stdout.encoding", &self.sun_stdout_encoding),
            ("sun.stderr.encoding", &self.sun_stderr_encoding),
            ("sun.io.unicode.encoding", &self.sun_io_unicode_encoding),
            ("sun.cpu.isalist", &self.sun_cpu_isalist),
            ("sun.cpu.endian", &self.sun_cpu_endian),
            ("http.proxyHost", &self.http_proxy_host),
            ("http.proxyPort", &self.http_proxy_port),
            ("https.proxyHost", &self.https_proxy_host),
            ("https.proxyPort", &self.https_proxy_port),
            ("ftp.proxyHost", &self.ftp_proxy_host),
            ("ftp.proxyPort", &self.ftp_proxy_port),
            ("socksProxyHost", &self.socks_proxy_host),
            ("socksProxyPort", &self.socks_proxy_port),
            ("gopherProxySet", &self.gopher_proxy_set),
            ("gopherProxyHost", &self.gopher_proxy_host),
            ("gopherProxyPort", &self.gopher_proxy_port),
            ("http.nonProxyHosts", &self.http_non_proxy_hosts),
            ("ftp.nonProxyHosts", &self.ftp_non_proxy_hosts),
            ("socksNonProxyHosts", &self.socks_non_proxy_hosts),
        ];

        entries
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
            .collect()
    }
}

/// Maps a Rust target OS name to the name Java reports for it.
fn java_os_name(os: &str) -> String {
    match os {
        "linux" => "Linux".into(),
        "macos" => "Mac OS X".into(),
        "windows" => "Windows".into(),
        "freebsd" => "FreeBSD".into(),
        other => other.into(),
    }
}

/// Splits a POSIX locale such as `en_US.UTF-8` into its language and
/// country.
fn parse_locale(locale: &str) -> (Option<String>, Option<String>) {
    let name = locale.split(['.', '@']).next().unwrap_or_default();
    if name.is_empty() || name == "C" || name == "POSIX" {
        return (None, None);
    }
    let mut parts = name.splitn(2, '_');
    let language = parts.next().map(ToString::to_string);
    let country = parts.next().map(ToString::to_string);
    (language, country)
}

/// Splits a proxy URL such as `http://proxy:3128/` into its host and port.
fn split_proxy(url: &str) -> Option<(String, String)> {
    let authority = url.split("://").last()?.trim_end_matches('/');
    let authority = authority.rsplit('@').next()?;
    let (host, port) = authority.rsplit_once(':')?;
    (!host.is_empty() && !port.is_empty()).then(|| (host.to_string(), port.to_string()))
}

#[cfg(test)]
mod test {
    use crate::native::environment::{parse_locale, split_proxy, EnvironmentConfig};

    #[test]
    fn only_defined_properties_are_reported() {
        let environment = EnvironmentConfig {
            os_name: Some("Linux".into()),
            http_proxy_port: Some("3128".into()),
            ..EnvironmentConfig::new()
        };
        let properties = environment.properties();

        assert_eq!(properties.len(), 2);
        assert_eq!(properties.get("os.name").map(String::as_str), Some("Linux"));
        assert_eq!(properties.get("http.proxyPort").map(String::as_str), Some("3128"));
    }

    #[test]
    fn locales_and_proxies_are_parsed() {
        assert_eq!(
            parse_locale("en_GB.UTF-8"),
            (Some("en".into()), Some("GB".into()))
        );
        assert_eq!(parse_locale("C.UTF-8"), (None, None));
        assert_eq!(
            split_proxy("http://user@proxy.local:3128/"),
            Some(("proxy.local".into(), "3128".into()))
        );
        assert_eq!(split_proxy("proxy.local"), None);
    }

    #[test]
    fn host_environment_defines_the_separators() {
        let environment = EnvironmentConfig::from_host();
        assert!(environment.file_separator.is_some());
        assert!(environment.line_separator.is_some());
        assert!(environment.os_name.is_some());
    }
}
