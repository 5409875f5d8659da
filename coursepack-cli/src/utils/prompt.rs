use std::io::Write;

/// Ask a yes/no question on stdout and read the answer from stdin.
/// Anything other than `y`/`yes` counts as no.
pub fn confirm(question: &str) -> Result<bool, std::io::Error> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
