#[macro_use]
extern crate log;

use argh::FromArgs;

use smb_share_browser::{Credentials, ShareBrowser, SystemTransport, TransportOptions};

#[derive(FromArgs)]
#[argh(description = "
where positional is the address of the SMB server.
Lists the shares of the server, or the root of a share when `-s` is given.")]
struct Args {
    #[argh(option, short = 'P', description = "specify password")]
    password: Option<String>,
    #[argh(option, short = 'u', description = "specify username")]
    username: String,
    #[argh(option, short = 'w', description = "specify workgroup")]
    workgroup: Option<String>,
    #[argh(option, short = 'p', description = "specify port")]
    port: Option<u16>,
    #[argh(option, short = 's', description = "specify share")]
    share: Option<String>,
    #[argh(positional, description = "server address")]
    server: String,
}

fn main() -> anyhow::Result<()> {
    assert!(env_logger::builder().try_init().is_ok());
    let args: Args = argh::from_env();
    let password = match &args.password {
        Some(p) => p.clone(),
        None => read_secret_from_tty("Password: ")?,
    };

    let mut options = TransportOptions::default();
    if let Some(port) = args.port {
        options = options.port(port);
    }
    if let Some(workgroup) = &args.workgroup {
        options = options.workgroup(workgroup);
    }
    info!(
        "initializing browser with server {} and username {}",
        args.server, args.username
    );
    let browser = ShareBrowser::new(SystemTransport::new(options));
    let credentials = Credentials::new(&args.server)
        .username(&args.username)
        .password(password);

    match &args.share {
        Some(share) => {
            info!("listing files at {}", share);
            for entry in browser.list_entries(&credentials, share)? {
                println!("{entry}");
            }
        }
        None => {
            info!("listing shares on {}", args.server);
            for share in browser.list_share_info(&credentials)? {
                match share.comment {
                    Some(comment) => println!("{}\t{:?}\t{}", share.name, share.kind, comment),
                    None => println!("{}\t{:?}", share.name, share.kind),
                }
            }
        }
    }

    Ok(())
}

/// Read a secret from tty with customisable prompt
fn read_secret_from_tty(prompt: &str) -> std::io::Result<String> {
    rpassword::prompt_password(prompt)
}
