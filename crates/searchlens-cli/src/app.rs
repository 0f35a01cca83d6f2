//! Command handling for the searchlens CLI.
//!
//! `App` owns the `AuthContext` for the life of the process and maps each
//! command onto session operations or the stored analysis input.

use std::io::{self, Write};

use anyhow::{anyhow, Result};
use tracing::{error, warn};

use searchlens_core::models::StoredAnalysis;
use searchlens_core::{ApiError, AuthContext, Config, SessionState};

const USAGE: &str = "\
Usage: searchlens <command>

Commands:
  login [email]                 Log in and store the access token
  register [email]              Create an account, then log in
  logout                        Forget the stored token and profile
  status                        Show the current session
  analyze <brand> <keyword>...  Save a brand and keywords for analysis
  results                       Show the saved analysis input
  shell                         Interactive mode that keeps the session in memory
  help                          Show this message";

pub struct App {
    ctx: AuthContext,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            ctx: AuthContext::new(config)?,
        })
    }

    /// Message for a token left over from an earlier run.
    /// The profile is not persisted, so such a session is only half restored.
    pub fn startup_notice(&self) -> Option<String> {
        match self.ctx.session().state() {
            SessionState::TokenOnly => Some(format!(
                "A saved session for {} was found, but its profile is not loaded. \
                 Run `login` to restore it or `logout` to discard it.",
                self.ctx.config().base_url()
            )),
            _ => None,
        }
    }

    /// Run one command. Returns `false` when the command asks to leave the shell.
    pub async fn run_command(&self, args: &[String]) -> Result<bool> {
        let command = args.first().map(String::as_str).unwrap_or("help");
        let rest = &args[args.len().min(1)..];

        match command {
            "login" => self.login(rest.first().map(String::as_str)).await?,
            "register" => self.register(rest.first().map(String::as_str)).await?,
            "logout" => self.logout(),
            "status" => self.status(),
            "analyze" => self.analyze(rest)?,
            "results" => self.results(),
            "exit" | "quit" => return Ok(false),
            "help" | "--help" | "-h" => println!("{}", USAGE),
            other => return Err(anyhow!("Unknown command: {}\n\n{}", other, USAGE)),
        }
        Ok(true)
    }

    /// Interactive loop; one session manager serves every command
    pub async fn shell(&self) -> Result<()> {
        println!("searchlens shell - type `help` for commands, `exit` to leave");
        loop {
            print!("searchlens> ");
            io::stdout().flush()?;

            let mut line = String::new();
            if io::stdin().read_line(&mut line)? == 0 {
                break;
            }
            let args: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if args.is_empty() {
                continue;
            }

            match self.run_command(&args).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        Ok(())
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    async fn login(&self, email: Option<&str>) -> Result<()> {
        let email = self.resolve_email(email)?;
        let password = Self::prompt_password()?;

        println!("Authenticating...");
        if let Err(e) = self.ctx.session().login(&email, &password).await {
            error!(error = %e, "Login failed");
            return Err(anyhow!(describe_error(&e)));
        }

        self.remember_email(&email);
        match self.ctx.session().user() {
            Some(user) => println!("Welcome, {}!", user.display_name()),
            None => println!("Logged in. The service returned no profile for this account."),
        }
        Ok(())
    }

    async fn register(&self, email: Option<&str>) -> Result<()> {
        let email = match email {
            Some(email) => email.to_string(),
            None => Self::prompt_required("Email")?,
        };
        let first_name = Self::prompt_required("First name")?;
        let last_name = Self::prompt_required("Last name")?;
        let password = Self::prompt_password()?;

        println!("Creating account...");
        if let Err(e) = self
            .ctx
            .session()
            .register(&email, &password, &first_name, &last_name, None)
            .await
        {
            error!(error = %e, "Registration failed");
            return Err(anyhow!(describe_error(&e)));
        }

        self.remember_email(&email);
        match self.ctx.session().user() {
            Some(user) => println!("Account created. Welcome, {}!", user.display_name()),
            None => println!("Account created and logged in."),
        }
        Ok(())
    }

    fn logout(&self) {
        self.ctx.session().logout();
        println!("Logged out.");
    }

    fn status(&self) {
        println!("API: {}", self.ctx.config().base_url());
        match self.ctx.session().state() {
            SessionState::Anonymous => println!("Not logged in."),
            SessionState::TokenOnly => {
                println!("Token stored, profile not loaded in this session.")
            }
            SessionState::Authenticated => {
                if let Some(user) = self.ctx.session().user() {
                    println!("Logged in as {} <{}>", user.display_name(), user.email);
                }
            }
        }
    }

    fn resolve_email(&self, email: Option<&str>) -> Result<String> {
        if let Some(email) = email {
            return Ok(email.to_string());
        }
        match self.ctx.config().last_email.as_deref() {
            Some(last) => {
                let input = Self::prompt(&format!("Email [{}]", last))?;
                Ok(if input.is_empty() { last.to_string() } else { input })
            }
            None => Self::prompt_required("Email"),
        }
    }

    fn remember_email(&self, email: &str) {
        if let Err(e) = Config::remember_email(email) {
            warn!(error = %e, "Failed to save config");
        }
    }

    fn prompt(label: &str) -> Result<String> {
        print!("{}: ", label);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    fn prompt_required(label: &str) -> Result<String> {
        let value = Self::prompt(label)?;
        if value.is_empty() {
            return Err(anyhow!("{} is required", label));
        }
        Ok(value)
    }

    fn prompt_password() -> Result<String> {
        let password = rpassword::prompt_password("Password: ")?;
        if password.is_empty() {
            return Err(anyhow!("Password is required"));
        }
        Ok(password)
    }

    // =========================================================================
    // Analysis input
    // =========================================================================

    fn analyze(&self, args: &[String]) -> Result<()> {
        let (brand, keywords) = parse_analysis_args(args)?;
        let analysis = StoredAnalysis::new(brand, keywords);
        self.ctx.cache().save_analysis(&analysis)?;
        println!(
            "Saved analysis input for {} ({} keywords). Run `results` to view it.",
            analysis.brand,
            analysis.keywords.len()
        );
        Ok(())
    }

    fn results(&self) {
        let Some(analysis) = self.ctx.cache().load_analysis() else {
            println!("No analysis input found. Run `analyze <brand> <keyword>...` first.");
            return;
        };

        let initial = analysis.initial().unwrap_or('?');
        println!("[{}] {}", initial, analysis.brand);
        println!(
            "Analyzed {} ({})",
            analysis.formatted_date(),
            analysis.age_display()
        );
        println!("Keywords: {}", analysis.keywords.join(", "));
    }
}

fn parse_analysis_args(args: &[String]) -> Result<(String, Vec<String>)> {
    let (brand, keywords) = args
        .split_first()
        .ok_or_else(|| anyhow!("Usage: analyze <brand> <keyword>..."))?;
    if keywords.is_empty() {
        return Err(anyhow!("At least one keyword is required"));
    }
    Ok((brand.clone(), keywords.to_vec()))
}

/// User-facing message for a failed auth call
fn describe_error(e: &ApiError) -> String {
    match e {
        ApiError::Unauthorized(_) => "Invalid email or password".to_string(),
        ApiError::Conflict(_) => "An account with this email already exists".to_string(),
        ApiError::RateLimited => "Too many attempts. Please wait and try again.".to_string(),
        ApiError::NetworkError(err) if err.is_timeout() => {
            "Connection timed out. Please try again.".to_string()
        }
        e if e.is_transport() => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        other => format!("Request failed: {}", other),
    }
}

// ============================================================================
// Tests
// ============================================================================
