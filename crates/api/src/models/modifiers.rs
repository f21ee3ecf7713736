use bitflags::bitflags;

bitflags! {
    /// Java declaration modifiers. Annotations are tracked separately.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[derive(serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const ABSTRACT = 1 << 3;
        const STATIC = 1 << 4;
        const FINAL = 1 << 5;
        const TRANSIENT = 1 << 6;
        const VOLATILE = 1 << 7;
        const SYNCHRONIZED = 1 << 8;
        const NATIVE = 1 << 9;
        const STRICTFP = 1 << 10;
        const DEFAULT = 1 << 11;

        const ACCESS = Self::PUBLIC.bits() | Self::PROTECTED.bits() | Self::PRIVATE.bits();
    }
}

/// Canonical source order of modifier keywords.
const KEYWORDS: [(Modifiers, &str); 12] = [
    (Modifiers::PUBLIC, "public"),
    (Modifiers::PROTECTED, "protected"),
    (Modifiers::PRIVATE, "private"),
    (Modifiers::ABSTRACT, "abstract"),
    (Modifiers::STATIC, "static"),
    (Modifiers::FINAL, "final"),
    (Modifiers::TRANSIENT, "transient"),
    (Modifiers::VOLATILE, "volatile"),
    (Modifiers::SYNCHRONIZED, "synchronized"),
    (Modifiers::NATIVE, "native"),
    (Modifiers::STRICTFP, "strictfp"),
    (Modifiers::DEFAULT, "default"),
];

impl Modifiers {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(_, kw)| *kw == keyword)
            .map(|(flag, _)| *flag)
    }

    /// Keywords in canonical order, e.g. `["public", "static"]`.
    pub fn keywords(&self) -> Vec<&'static str> {
        KEYWORDS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, kw)| *kw)
            .collect()
    }

    /// Source form, space separated, without a trailing space.
    pub fn to_source(&self) -> String {
        self.keywords().join(" ")
    }
}
