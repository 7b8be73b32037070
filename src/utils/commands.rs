use std::{
    io,
    process::{Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
};

/// Returns a std::process::Command from a given command str and it's arguments
pub fn get_launch_command<'a>(
    command: &str,
    args: impl IntoIterator<Item = &'a str>,
    env_vars: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Command {
    let mut command = Command::new(command);
    command.envs(env_vars).args(args);

    command
}

/// Same as [`get_launch_command`], for an application installed with flatpak
pub fn get_launch_command_flatpak<'a>(
    app_name: &str,
    flatpak_args: impl IntoIterator<Item = &'a str>,
    other_args: impl IntoIterator<Item = &'a str>,
    env_vars: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Command {
    let mut command = get_launch_command("flatpak", flatpak_args, env_vars);
    command.arg("run").arg(app_name).args(other_args);

    command
}

/// Detaches the standard streams of a command, so a spawned process can never write over the
/// terminal menu or wait on its input
pub fn detach_stdio(command: &mut Command) -> &mut Command {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
}

/// Starts the command without waiting for it. The child is reaped on a background thread, so
/// it does not linger as a zombie once it exits.
pub fn spawn_detached(command: &mut Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command.spawn()?;
    Ok(thread::spawn(move || child.wait()))
}
