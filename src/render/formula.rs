//! Ruby formula rendering.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::descriptor::{Os, PlatformArchive};
use crate::validator::Validated;

const HEADER: &str = "# typed: false
# frozen_string_literal: true

# This file was generated by Brewtap. DO NOT EDIT.
";

static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_.\s]([a-zA-Z0-9])").unwrap());

static AT_VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(.)@(\d)").unwrap());

/// Homebrew's formula class name for `name`, e.g.
/// `test-generate-formula-empty-fields` -> `TestGenerateFormulaEmptyFields`
/// and `python@3.12` -> `PythonAT312`.
pub fn class_name(name: &str) -> String {
    let mut chars = name.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    };
    let joined = SEPARATOR_RE.replace_all(&capitalized, |caps: &Captures| caps[1].to_uppercase());
    let plus = joined.replace('+', "x");
    AT_VERSION_RE.replace(&plus, "${1}AT${2}").into_owned()
}

/// Quote `value` as a Ruby double-quoted string literal.
///
/// `#` is only escaped where Ruby would start an interpolation.
pub fn ruby_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => out.push_str("\\#"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a validated descriptor as a Homebrew formula.
pub fn render(validated: &Validated<'_>) -> String {
    let d = validated.descriptor();
    let mut output = String::from(HEADER);

    if d.checksum().is_unverified() {
        tracing::warn!(
            name = d.name(),
            "rendering formula with unverified all-zero checksum"
        );
    }

    if let Some(require) = d.custom_require() {
        output.push_str(&format!("require_relative {}\n", ruby_string(require)));
    }
    output.push_str(&format!("class {} < Formula\n", class_name(d.name())));
    for module in d.includes() {
        output.push_str(&format!("  include {module}\n"));
    }

    output.push_str(&format!("  desc {}\n", ruby_string(d.description())));
    output.push_str(&format!("  homepage {}\n", ruby_string(d.homepage_url())));
    match d.download_strategy() {
        Some(strategy) => output.push_str(&format!(
            "  url {}, using: {strategy}\n",
            ruby_string(d.source_url())
        )),
        None => output.push_str(&format!("  url {}\n", ruby_string(d.source_url()))),
    }
    output.push_str(&format!(
        "  {} {}\n",
        d.checksum().algorithm.formula_key(),
        ruby_string(d.checksum().as_str())
    ));
    if let Some(version) = d.version() {
        output.push_str(&format!("  version {}\n", ruby_string(version)));
    }
    if let Some(license) = d.license() {
        output.push_str(&format!("  license {}\n", ruby_string(license)));
    }

    render_targets(&mut output, d.targets());

    if !d.dependencies().is_empty() {
        output.push('\n');
        for dep in d.dependencies() {
            match dep.kind.symbol() {
                Some(symbol) => output.push_str(&format!(
                    "  depends_on {} => {symbol}\n",
                    ruby_string(&dep.name)
                )),
                None => output.push_str(&format!("  depends_on {}\n", ruby_string(&dep.name))),
            }
        }
    }

    output.push_str("\n  def install\n");
    for step in d.install_steps() {
        if step.installed_name.is_empty() {
            output.push_str(&format!("    bin.install {}\n", ruby_string(&step.source_path)));
        } else {
            output.push_str(&format!(
                "    bin.install {} => {}\n",
                ruby_string(&step.source_path),
                ruby_string(&step.installed_name)
            ));
        }
    }
    output.push_str("  end\n");

    if let Some(test) = d.test() {
        output.push_str("\n  test do\n");
        push_indented(&mut output, test, "    ");
        output.push_str("  end\n");
    }

    if let Some(caveats) = d.caveats() {
        output.push_str("\n  def caveats\n    <<~EOS\n");
        for line in caveats.lines() {
            if line.is_empty() {
                output.push('\n');
            } else {
                output.push_str("      ");
                output.push_str(&heredoc_line(line));
                output.push('\n');
            }
        }
        output.push_str("    EOS\n  end\n");
    }

    output.push_str("end\n");
    output
}

/// `on_macos`/`on_linux` blocks, each holding `on_intel`/`on_arm` archives.
/// Targets are emitted in platform order regardless of input order.
fn render_targets(output: &mut String, targets: &[PlatformArchive]) {
    let mut sorted: Vec<&PlatformArchive> = targets.iter().collect();
    sorted.sort_by_key(|t| t.platform);

    for os in [Os::MacOs, Os::Linux] {
        let for_os: Vec<&&PlatformArchive> =
            sorted.iter().filter(|t| t.platform.os() == os).collect();
        if for_os.is_empty() {
            continue;
        }
        output.push_str(&format!("\n  {} do\n", os.block()));
        for target in for_os {
            output.push_str(&format!("    {} do\n", target.platform.arch().block()));
            output.push_str(&format!("      url {}\n", ruby_string(&target.url)));
            output.push_str(&format!(
                "      {} {}\n",
                target.checksum.algorithm.formula_key(),
                ruby_string(target.checksum.as_str())
            ));
            output.push_str("    end\n");
        }
        output.push_str("  end\n");
    }
}

/// Escape one line of an interpolating `<<~EOS` heredoc so Ruby reads it
/// back verbatim.
///
/// Leading spaces and tabs are written as `\s`/`\t` so the squiggly
/// heredoc never strips them, and a line that would terminate the heredoc
/// has its `E` written as `\x45`.
pub fn heredoc_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let body = line.trim_start_matches(&[' ', '\t'][..]);
    for c in line[..line.len() - body.len()].chars() {
        out.push_str(if c == ' ' { "\\s" } else { "\\t" });
    }

    let mut chars = body.chars().peekable();
    if body.trim_end() == "EOS" {
        chars.next();
        out.push_str("\\x45");
    }
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => out.push_str("\\#"),
            '\t' => out.push('\t'),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

fn push_indented(output: &mut String, text: &str, indent: &str) {
    for line in text.trim_end().lines() {
        if line.trim().is_empty() {
            output.push('\n');
        } else {
            output.push_str(indent);
            output.push_str(line.trim_end());
            output.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::fixtures::{empty_fields, empty_fields_builder};
    use crate::descriptor::{Checksum, Dependency, DependencyKind, InstallStep, Platform};
    use crate::validator::validate;
    use pretty_assertions::assert_eq;

    const EMPTY_FIELDS_FORMULA: &str = r#"# typed: false
# frozen_string_literal: true

# This file was generated by Brewtap. DO NOT EDIT.
class TestGenerateFormulaEmptyFields < Formula
  desc "NA"
  homepage "https://github.com/Justintime50/test-generate-formula-empty-fields"
  url "https://github.com/Justintime50/test-generate-formula-empty-fields/archive/v0.1.0.tar.gz"
  sha256 "0000000000000000000000000000000000000000000000000000000000000000"

  def install
    bin.install "src/secure-browser-kiosk.sh" => "secure-browser-kiosk"
  end
end
"#;

    #[test]
    fn empty_fields_formula_matches_byte_for_byte() {
        let descriptor = empty_fields();
        let validated = validate(&descriptor).unwrap();
        assert_eq!(render(&validated), EMPTY_FIELDS_FORMULA);
    }

    #[test]
    fn rendering_is_deterministic() {
        let descriptor = empty_fields_builder()
            .target(PlatformArchive {
                platform: Platform::LinuxArm64,
                url: "https://e.com/linux-arm64.tar.gz".into(),
                checksum: Checksum::sha256("c".repeat(64)),
            })
            .target(PlatformArchive {
                platform: Platform::DarwinAmd64,
                url: "https://e.com/darwin-amd64.tar.gz".into(),
                checksum: Checksum::sha256("d".repeat(64)),
            })
            .build()
            .unwrap();
        let validated = validate(&descriptor).unwrap();
        assert_eq!(render(&validated), render(&validated));
    }

    #[test]
    fn class_names_follow_homebrew() {
        assert_eq!(
            class_name("test-generate-formula-empty-fields"),
            "TestGenerateFormulaEmptyFields"
        );
        assert_eq!(class_name("python@3.12"), "PythonAT312");
        assert_eq!(class_name("gtk+3"), "Gtkx3");
        assert_eq!(class_name("my_tool.rs"), "MyToolRs");
        assert_eq!(class_name("YAML-CPP"), "YamlCpp");
    }

    #[test]
    fn ruby_string_escapes_quotes_and_interpolation() {
        assert_eq!(ruby_string(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(ruby_string("a\\b"), r#""a\\b""#);
        assert_eq!(ruby_string("#{system}"), r#""\#{system}""#);
        assert_eq!(ruby_string("issue #12"), r#""issue #12""#);
        assert_eq!(ruby_string("line\nnext"), r#""line\nnext""#);
        assert_eq!(ruby_string("\u{7}"), r#""\u{7}""#);
    }

    #[test]
    fn heredoc_lines_cannot_end_the_heredoc_or_interpolate() {
        assert_eq!(heredoc_line("EOS"), r"\x45OS");
        assert_eq!(heredoc_line("EOS  "), r"\x45OS  ");
        assert_eq!(heredoc_line("  EOS"), r"\s\sEOS");
        assert_eq!(heredoc_line("Cost #{`id`}"), r"Cost \#{`id`}");
        assert_eq!(heredoc_line(r"C:\tools"), r"C:\\tools");
        assert_eq!(heredoc_line("\tindented"), r"\tindented");
        assert_eq!(heredoc_line("plain \"text\" #1"), "plain \"text\" #1");
    }

    #[test]
    fn caveats_escape_inside_the_heredoc() {
        let descriptor = empty_fields_builder()
            .caveats("Path: C:\\tools\nEOS\nend")
            .build()
            .unwrap();
        let formula = render(&validate(&descriptor).unwrap());
        assert!(formula.contains(
            "  def caveats\n    <<~EOS\n      Path: C:\\\\tools\n      \\x45OS\n      end\n    EOS\n  end\n"
        ));
    }

    #[test]
    fn optional_sections_render_in_order() {
        let descriptor = empty_fields_builder()
            .description("Kiosk launcher")
            .version("0.1.0")
            .license("MIT")
            .custom_require("../lib/private_strategy")
            .download_strategy("GitHubPrivateRepositoryReleaseDownloadStrategy")
            .include("Language::Python::Virtualenv")
            .dependency(Dependency::new("jq", DependencyKind::Runtime))
            .dependency(Dependency::new("go", DependencyKind::Build))
            .install_step(InstallStep::new("README.md", ""))
            .test("assert_match \"usage\", shell_output(\"#{bin}/secure-browser-kiosk -h\")")
            .caveats("Run once to configure.\n\nThen reboot.")
            .target(PlatformArchive {
                platform: Platform::DarwinArm64,
                url: "https://e.com/darwin-arm64.tar.gz".into(),
                checksum: Checksum::sha256("a".repeat(64)),
            })
            .build()
            .unwrap();
        let validated = validate(&descriptor).unwrap();
        let formula = render(&validated);

        let expected = format!(
            r##"# typed: false
# frozen_string_literal: true

# This file was generated by Brewtap. DO NOT EDIT.
require_relative "../lib/private_strategy"
class TestGenerateFormulaEmptyFields < Formula
  include Language::Python::Virtualenv
  desc "Kiosk launcher"
  homepage "https://github.com/Justintime50/test-generate-formula-empty-fields"
  url "https://github.com/Justintime50/test-generate-formula-empty-fields/archive/v0.1.0.tar.gz", using: GitHubPrivateRepositoryReleaseDownloadStrategy
  sha256 "{zeros}"
  version "0.1.0"
  license "MIT"

  on_macos do
    on_arm do
      url "https://e.com/darwin-arm64.tar.gz"
      sha256 "{a}"
    end
  end

  depends_on "jq"
  depends_on "go" => :build

  def install
    bin.install "src/secure-browser-kiosk.sh" => "secure-browser-kiosk"
    bin.install "README.md"
  end

  test do
    assert_match "usage", shell_output("#{{bin}}/secure-browser-kiosk -h")
  end

  def caveats
    <<~EOS
      Run once to configure.

      Then reboot.
    EOS
  end
end
"##,
            zeros = "0".repeat(64),
            a = "a".repeat(64),
        );
        assert_eq!(formula, expected);
    }

    #[test]
    fn targets_group_by_os_in_platform_order() {
        let descriptor = empty_fields_builder()
            .target(PlatformArchive {
                platform: Platform::LinuxAmd64,
                url: "https://e.com/linux-amd64.tar.gz".into(),
                checksum: Checksum::sha256("1".repeat(64)),
            })
            .target(PlatformArchive {
                platform: Platform::DarwinArm64,
                url: "https://e.com/darwin-arm64.tar.gz".into(),
                checksum: Checksum::sha256("2".repeat(64)),
            })
            .target(PlatformArchive {
                platform: Platform::DarwinAmd64,
                url: "https://e.com/darwin-amd64.tar.gz".into(),
                checksum: Checksum::sha256("3".repeat(64)),
            })
            .build()
            .unwrap();
        let validated = validate(&descriptor).unwrap();
        let formula = render(&validated);

        let macos = formula.find("on_macos do").unwrap();
        let linux = formula.find("on_linux do").unwrap();
        let intel = formula.find("darwin-amd64").unwrap();
        let arm = formula.find("darwin-arm64").unwrap();
        assert!(macos < intel && intel < arm && arm < linux);
    }
}
