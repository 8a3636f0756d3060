use std::fmt;
use std::ops::BitOr;

/// Effective permission bits of a user in a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Permissions(u64);

impl Permissions {
    pub const NONE: Self = Self(0);
    pub const CREATE_INSTANT_INVITE: Self = Self(1 << 0);
    pub const KICK_MEMBERS: Self = Self(1 << 1);
    pub const BAN_MEMBERS: Self = Self(1 << 2);
    pub const ADMINISTRATOR: Self = Self(1 << 3);
    pub const MANAGE_CHANNELS: Self = Self(1 << 4);
    pub const MANAGE_GUILD: Self = Self(1 << 5);
    pub const MANAGE_MESSAGES: Self = Self(1 << 13);
    pub const MANAGE_ROLES: Self = Self(1 << 28);

    const TAGS: [(&'static str, Self); 8] = [
        ("CREATE_INSTANT_INVITE", Self::CREATE_INSTANT_INVITE),
        ("KICK_MEMBERS", Self::KICK_MEMBERS),
        ("BAN_MEMBERS", Self::BAN_MEMBERS),
        ("ADMINISTRATOR", Self::ADMINISTRATOR),
        ("MANAGE_CHANNELS", Self::MANAGE_CHANNELS),
        ("MANAGE_GUILD", Self::MANAGE_GUILD),
        ("MANAGE_MESSAGES", Self::MANAGE_MESSAGES),
        ("MANAGE_ROLES", Self::MANAGE_ROLES),
    ];

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Look up the bit for a permission tag such as `BAN_MEMBERS`
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::TAGS
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, bit)| *bit)
    }

    /// Union of all known tags; unknown tags are skipped
    pub fn from_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        tags.into_iter()
            .filter_map(Self::from_tag)
            .fold(Self::NONE, |acc, bit| acc | bit)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the set grants the named tag. Unknown tags are never granted,
    /// and `ADMINISTRATOR` does not imply the other bits.
    pub fn has_tag(self, tag: &str) -> bool {
        Self::from_tag(tag).is_some_and(|bit| self.contains(bit))
    }

    pub fn tags(self) -> impl Iterator<Item = &'static str> {
        Self::TAGS
            .into_iter()
            .filter(move |(_, bit)| self.contains(*bit))
            .map(|(name, _)| name)
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self.tags().collect();
        write!(f, "[{}]", tags.join(", "))
    }
}
