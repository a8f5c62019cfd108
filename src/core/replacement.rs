// ─── Library Replacements ───
// Static substitution rules for library versions that do not run on this
// platform. Pure data + predicate; the plan builder resolves a match into
// a concrete request before anything is fetched.

use crate::core::maven::MavenCoordinate;

/// A version-gated substitution rule.
///
/// Replacement metadata carries no size, so a substituted request reports
/// size 0 and is excluded from plan-total accounting.
pub struct LibraryReplacement {
    /// `group:artifact` this rule applies to.
    group_artifact: &'static str,
    /// Libraries already at this version are left alone.
    replacement_version: &'static str,
    /// Game versions (major, minor) the rule fires for.
    applies: fn(u32, u32) -> bool,
    /// Path of the replacement relative to the libraries directory.
    pub path: &'static str,
    pub url: &'static str,
    pub sha1: &'static str,
}

/// Manifests from 1.13 onward pin JNA builds that fail to load here;
/// force 5.13.0.
const RULES: &[LibraryReplacement] = &[
    LibraryReplacement {
        group_artifact: "net.java.dev.jna:jna",
        replacement_version: "5.13.0",
        applies: |major, minor| major == 1 && minor >= 13,
        path: "net/java/dev/jna/jna/5.13.0/jna-5.13.0.jar",
        url: "https://repo1.maven.org/maven2/net/java/dev/jna/jna/5.13.0/jna-5.13.0.jar",
        sha1: "1200e7ebeedbe0d10062093f32925a912020e747",
    },
    LibraryReplacement {
        group_artifact: "net.java.dev.jna:jna-platform",
        replacement_version: "5.13.0",
        applies: |major, minor| major == 1 && minor >= 13,
        path: "net/java/dev/jna/jna-platform/5.13.0/jna-platform-5.13.0.jar",
        url: "https://repo1.maven.org/maven2/net/java/dev/jna/jna-platform/5.13.0/jna-platform-5.13.0.jar",
        sha1: "88e9a306715e9379f3122415ef4ae759a352640d",
    },
];

impl LibraryReplacement {
    /// Does this rule fire for `coord` under game version `(major, minor)`?
    pub fn matches(&self, coord: &MavenCoordinate, major_minor: (u32, u32)) -> bool {
        let (major, minor) = major_minor;
        if !(self.applies)(major, minor) {
            return false;
        }
        if format!("{}:{}", coord.group_id, coord.artifact_id) != self.group_artifact {
            return false;
        }
        coord.version != self.replacement_version
    }
}

/// Find the replacement rule for a library, if any.
///
/// `major_minor` is `None` when the manifest id is absent or unparseable;
/// no rule fires in that case.
pub fn find_replacement(
    coord: &MavenCoordinate,
    major_minor: Option<(u32, u32)>,
) -> Option<&'static LibraryReplacement> {
    let major_minor = major_minor?;
    RULES.iter().find(|rule| rule.matches(coord, major_minor))
}
