use clap::Parser;
use std::collections::HashMap;

/// Program name used as `argv[0]` when arguments come from GET parameters
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
const BIN_NAME: &str = "landmark-map";

#[cfg(target_arch = "wasm32")]
thread_local! {
    static ENV_MAP: std::cell::RefCell<HashMap<String, String>> = std::cell::RefCell::new(HashMap::new());
}

/// Generic function to get environment variable, parsing it to the desired type.
/// On web, variables come from `?envNAME=value` GET parameters (see [`parse_env`]).
#[allow(dead_code)]
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    #[cfg(target_arch = "wasm32")]
    {
        ENV_MAP.with(|map| map.borrow().get(key).and_then(|s| s.parse().ok()))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::env::var(key).ok().and_then(|s| s.parse().ok())
    }
}

/// Parses from the command line arguments on native and from GET parameters on web.
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        T::try_parse()
    }
    #[cfg(target_arch = "wasm32")]
    {
        let (args, _) = split_query(&current_href());
        T::try_parse_from(args)
    }
}

/// Parses environment variables from GET parameters on web.
pub fn parse_env() {
    #[cfg(target_arch = "wasm32")]
    {
        let (_, env) = split_query(&current_href());
        ENV_MAP.with(|map| map.borrow_mut().extend(env));
    }
}

#[cfg(target_arch = "wasm32")]
fn current_href() -> String {
    web_sys::window()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default()
}

/// Split a page URL into CLI arguments (`cliNAME=value` becomes `--NAME value`)
/// and environment variables (`envNAME=value`). Other parameters are ignored.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn split_query(href: &str) -> (Vec<String>, HashMap<String, String>) {
    let mut args = vec![BIN_NAME.to_string()];
    let mut env = HashMap::new();

    let Some((_, query)) = href.split_once('?') else {
        return (args, env);
    };
    let query = query.split('#').next().unwrap_or_default();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if let Some(arg_key) = key.strip_prefix("cli") {
            if !arg_key.is_empty() {
                args.push(format!("--{}", arg_key));
            }
            if !value.is_empty() {
                args.push(value.to_string());
            }
        } else if let Some(env_key) = key.strip_prefix("env")
            && !env_key.is_empty()
        {
            env.insert(env_key.to_string(), value.to_string());
        }
    }

    (args, env)
}
