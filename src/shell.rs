use std::io::IsTerminal;

/// Subcommands whose stdout is a sandbox path the shell wrapper should `cd`
/// into. Both wrapper generators read from this list.
pub const CD_SUBCOMMANDS: &[&str] = &["new"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Posix,
    Fish,
}

impl Shell {
    fn setup_line(&self) -> &'static str {
        match self {
            Shell::Fish => "sandpit shell-setup --fish | source",
            Shell::Posix => r#"eval "$(sandpit shell-setup)""#,
        }
    }

    fn function_output(&self) -> String {
        match self {
            Shell::Fish => fish_function(),
            Shell::Posix => posix_function(),
        }
    }
}

/// POSIX `sandpit` function. A bare `sandpit` or `sandpit new` runs the
/// binary, takes the sandbox path it prints and moves the shell there. Other
/// subcommands pass straight through.
fn posix_function() -> String {
    let test = CD_SUBCOMMANDS
        .iter()
        .map(|sub| format!(r#"[ "$1" = {sub} ]"#))
        .collect::<Vec<_>>()
        .join(" || ");
    format!(
        r#"sandpit() {{
    if [ "$#" -eq 0 ] || {test}; then
        _sandpit_dir="$(command sandpit "$@")" || return $?
        [ -n "$_sandpit_dir" ] && cd "$_sandpit_dir"
    else
        command sandpit "$@"
    fi
}}"#
    )
}

/// Fish version of [`posix_function`].
fn fish_function() -> String {
    let subs = CD_SUBCOMMANDS.join(" ");
    format!(
        r#"function sandpit
    if test (count $argv) -eq 0; or contains -- "$argv[1]" {subs}
        set -l dir (command sandpit $argv); or return $status
        test -n "$dir"; and cd "$dir"
    else
        command sandpit $argv
    end
end"#
    )
}

/// Print the wrapper to stdout, with an install hint on stderr when run
/// interactively.
pub fn print_shell_setup(shell: Shell) {
    println!("{}", shell.function_output());
    if std::io::stdout().is_terminal() {
        eprintln!("# Add this to your shell config:");
        eprintln!("#   {}", shell.setup_line());
    }
}
