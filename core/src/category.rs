//! AbuseIPDB abuse categories.
//!
//! See <https://www.abuseipdb.com/categories>.

use std::fmt;

/// A category a reported IP address can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Category {
    DnsCompromise = 1,
    DnsPoisoning = 2,
    FraudOrders = 3,
    DdosAttack = 4,
    FtpBruteForce = 5,
    PingOfDeath = 6,
    Phishing = 7,
    FraudVoip = 8,
    OpenProxy = 9,
    WebSpam = 10,
    EmailSpam = 11,
    BlogSpam = 12,
    VpnIp = 13,
    PortScan = 14,
    Hacking = 15,
    SqlInjection = 16,
    Spoofing = 17,
    BruteForce = 18,
    BadWebBot = 19,
    ExploitedHost = 20,
    WebAppAttack = 21,
    Ssh = 22,
    IotTargeted = 23,
}

impl Category {
    pub const ALL: [Category; 23] = [
        Category::DnsCompromise,
        Category::DnsPoisoning,
        Category::FraudOrders,
        Category::DdosAttack,
        Category::FtpBruteForce,
        Category::PingOfDeath,
        Category::Phishing,
        Category::FraudVoip,
        Category::OpenProxy,
        Category::WebSpam,
        Category::EmailSpam,
        Category::BlogSpam,
        Category::VpnIp,
        Category::PortScan,
        Category::Hacking,
        Category::SqlInjection,
        Category::Spoofing,
        Category::BruteForce,
        Category::BadWebBot,
        Category::ExploitedHost,
        Category::WebAppAttack,
        Category::Ssh,
        Category::IotTargeted,
    ];

    /// Numeric identifier used on the wire.
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::DnsCompromise => "Altering DNS records resulting in improper redirection.",
            Category::DnsPoisoning => "Falsifying domain server cache (cache poisoning).",
            Category::FraudOrders => "Fraudulent orders.",
            Category::DdosAttack => "Participating in distributed denial-of-service (usually part of botnet).",
            Category::FtpBruteForce => "FTP brute-force.",
            Category::PingOfDeath => "Oversized IP packet.",
            Category::Phishing => "Phishing websites and/or email.",
            Category::FraudVoip => "Fraudulent VoIP.",
            Category::OpenProxy => "Open proxy, open relay, or Tor exit node.",
            Category::WebSpam => "Comment/forum spam, HTTP referer spam, or other CMS spam.",
            Category::EmailSpam => "Spam email content, infected attachments, and phishing emails.",
            Category::BlogSpam => "CMS blog comment spam.",
            Category::VpnIp => "Conjunctive category.",
            Category::PortScan => "Scanning for open ports and vulnerable services.",
            Category::Hacking => "Hacking.",
            Category::SqlInjection => "Attempts at SQL injection.",
            Category::Spoofing => "Email sender spoofing.",
            Category::BruteForce => "Credential brute-force attacks on webpage logins and services.",
            Category::BadWebBot => "Webpage scraping and crawlers that do not honor robots.txt.",
            Category::ExploitedHost => "Host is likely infected with malware and being used for other attacks.",
            Category::WebAppAttack => "Attempts to probe for or exploit installed web applications.",
            Category::Ssh => "Secure Shell (SSH) abuse.",
            Category::IotTargeted => "Abuse was targeted at an Internet of Things type device.",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl TryFrom<u8> for Category {
    type Error = u8;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            1..=23 => Ok(Category::ALL[usize::from(id) - 1]),
            other => Err(other),
        }
    }
}

/// Join category ids with `,`, keeping the caller's order.
pub fn build_category_string(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| c.id().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_encodes_to_empty_string() {
        assert_eq!(build_category_string(&[]), "");
    }

    #[test]
    fn order_is_preserved() {
        let got = build_category_string(&[Category::DdosAttack, Category::BruteForce, Category::Ssh]);
        assert_eq!(got, "4,18,22");

        let got = build_category_string(&[Category::Ssh, Category::DdosAttack]);
        assert_eq!(got, "22,4");
    }

    #[test]
    fn ids_match_position_in_all() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(usize::from(category.id()), i + 1);
            assert_eq!(Category::try_from(category.id()), Ok(*category));
        }
    }

    #[test]
    fn try_from_rejects_unknown_ids() {
        assert_eq!(Category::try_from(0), Err(0));
        assert_eq!(Category::try_from(24), Err(24));
    }

    #[test]
    fn display_is_numeric_id() {
        assert_eq!(Category::PortScan.to_string(), "14");
        assert!(!Category::PortScan.description().is_empty());
    }
}
