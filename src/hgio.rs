use anyhow::Result;
use crate::decode;
use crate::model::{BranchRef, CurrentBranch};
use crate::util::{escape_quotes, run_hg};

pub fn version(repo: &str) -> Result<String> {
    run_hg(repo, &vec!["--version".into()])
}

pub fn current_branch(repo: &str) -> Result<CurrentBranch> {
    let out = run_hg(repo, &vec!["identify".into(), "-i".into(), "-b".into()])?;
    decode::parse_ident(&out)
}

pub fn branch_heads(repo: &str) -> Result<Vec<BranchRef>> {
    let out = run_hg(repo, &vec![
        "heads".into(),
        "--template".into(),
        "{date|hgdate}|{node}|{branch}\\n".into(),
    ])?;
    decode::parse_heads(&out)
}

pub fn update_to(repo: &str, node: &str) -> Result<()> {
    run_hg(repo, &vec!["update".into(), "-r".into(), node.into()])?;
    Ok(())
}

pub fn mark_branch(repo: &str, name: &str) -> Result<()> {
    run_hg(repo, &vec!["branch".into(), "-f".into(), escape_quotes(name)])?;
    Ok(())
}

pub fn close_commit(repo: &str, message: &str) -> Result<()> {
    run_hg(repo, &vec![
        "commit".into(),
        "-X".into(), "glob:**".into(),
        "--close-branch".into(),
        "-m".into(), message.into(),
    ])?;
    Ok(())
}
