//! Role tags carried by person and organization link rows

use std::fmt;
use std::str::FromStr;

macro_rules! role_set {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| {
                        let allowed: Vec<_> = Self::ALL.iter().map(|r| r.as_str()).collect();
                        format!("unknown role '{trimmed}', expected one of {}", allowed.join(", "))
                    })
            }
        }
    };
}

role_set!(
    /// Roles a person can hold on an element or set.
    PersonRole {
        Author => "author",
        Editor => "editor",
        Reviewer => "reviewer",
        Translator => "translator",
        Contributor => "contributor",
    }
);

role_set!(
    /// Roles an organization can hold on an element or set.
    OrganizationRole {
        Author => "author",
        Sponsor => "sponsor",
        Translator => "translator",
        Contributor => "contributor",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("Author".parse::<PersonRole>().unwrap(), PersonRole::Author);
        assert_eq!(
            " SPONSOR ".parse::<OrganizationRole>().unwrap(),
            OrganizationRole::Sponsor
        );
    }

    #[test]
    fn role_sets_differ_between_people_and_organizations() {
        assert!("sponsor".parse::<PersonRole>().is_err());
        assert!("reviewer".parse::<OrganizationRole>().is_err());
        assert!("editor".parse::<OrganizationRole>().is_err());
        let err = "owner".parse::<PersonRole>().unwrap_err();
        assert!(err.contains("owner"));
        assert!(err.contains("reviewer"));
    }
}
