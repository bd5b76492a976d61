//! # Source Patching Module / 源码修补模块
//!
//! Rewrites a source file's entry-point declaration so that running the file
//! executes exactly one test case through the harness.
//!
//! 改写源文件的入口点声明，使运行该文件时只通过测试框架执行一个测试用例。

/// Placeholder substituted with the test case's command in a harness template.
pub const COMMAND_PLACEHOLDER: &str = "{command}";

/// Fills the harness template with a test case's command.
///
/// ```
/// use suite_runner::core::patch::harness_invocation;
/// assert_eq!(harness_invocation("goTest $ {command}", "addOneCases"), "goTest $ addOneCases");
/// ```
pub fn harness_invocation(template: &str, command: &str) -> String {
    template.replace(COMMAND_PLACEHOLDER, command)
}

/// Replaces the first top-level `entry_point = ...` declaration of `source`
/// with `entry_point = invocation`. Indented continuation lines of the old
/// declaration are dropped with it, including those after blank lines inside
/// the body; the body ends at the next non-blank line in column zero. Returns `None` when no declaration matches.
///
/// 将 `source` 中第一个顶层 `entry_point = ...` 声明替换为 `entry_point = invocation`。
/// 旧声明的缩进续行会一并删除。找不到匹配的声明时返回 `None`。
pub fn patch_entry_point(source: &str, entry_point: &str, invocation: &str) -> Option<String> {
    let mut patched = String::with_capacity(source.len() + invocation.len());
    let mut replaced = false;
    let mut in_old_body = false;
    // Blank lines seen inside the old body. They are kept only if the body
    // ends right after them.
    let mut blanks = String::new();

    for line in source.split_inclusive('\n') {
        if in_old_body {
            if line.trim().is_empty() {
                blanks.push_str(line);
                continue;
            }
            if is_continuation(line) {
                blanks.clear();
                continue;
            }
            patched.push_str(&blanks);
            blanks.clear();
            in_old_body = false;
        }

        if !replaced && declares(line, entry_point) {
            patched.push_str(entry_point);
            patched.push_str(" = ");
            patched.push_str(invocation);
            patched.push_str(line_ending(line));
            replaced = true;
            in_old_body = true;
            continue;
        }

        patched.push_str(line);
    }
    patched.push_str(&blanks);

    replaced.then_some(patched)
}

/// `main = ...` or `main=...` at column zero; `main == x` and `mainly = x` do not count.
fn declares(line: &str, entry_point: &str) -> bool {
    let Some(rest) = line.strip_prefix(entry_point) else {
        return false;
    };
    let rest = rest.trim_start_matches([' ', '\t']);
    rest.starts_with('=') && !rest.starts_with("==")
}

fn is_continuation(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

fn line_ending(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}
