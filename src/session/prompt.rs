//! Prompt matching and synchronization
//!
//! Detecting an idle interactive shell over a laggy serial line without
//! knowing its prompt in advance: send bare line terminators, capture what
//! comes back, and treat two nearly-identical consecutive captures as
//! evidence of a stable prompt. Once synchronized, the shell can be told to
//! emit a unique, collision-resistant prompt for reliable matching.

use std::time::{Duration, Instant};

use crate::distance::levenshtein;
use crate::pattern::Pattern;
use crate::result::ExpectError;
use crate::session::{Session, Wait};

/// Regex matching the unique prompt installed by
/// [`Session::set_unique_prompt`]. Bracketed and unusual enough that shell
/// output is unlikely to collide with it.
pub const UNIQUE_PROMPT: &str = r"\[SEREX\][\$\#] ";

/// POSIX-shell command that sets [`UNIQUE_PROMPT`] as the primary prompt.
pub const PROMPT_SET_SH: &str = r"PS1='[SEREX]\$ '";

/// C-shell command that sets [`UNIQUE_PROMPT`] as the primary prompt.
pub const PROMPT_SET_CSH: &str = r"set prompt='[SEREX]\$ '";

/// Two consecutive idle captures must differ by less than this
/// edit-distance/length ratio to count as the same prompt.
const SYNC_RATIO_MAX: f64 = 0.4;

/// How long to wait for the shell to echo the newly-set unique prompt.
const PROMPT_SET_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-attempt budget while skipping queued prompts.
const LAST_PROMPT_TIMEOUT: Duration = Duration::from_secs(1);

impl Session {
    /// Match the next shell prompt.
    ///
    /// Builds the alternative list from the active prompt pattern(s) with
    /// timeout as the implicit last alternative. Returns `true` if a real
    /// pattern matched, `false` on timeout. [`before`](Session::before) is
    /// rewritten either way.
    ///
    /// # Errors
    ///
    /// Fails with `PromptNotSet` if no prompt pattern is configured; an unset
    /// prompt is a configuration error, not a default.
    pub fn prompt(&mut self, wait: Wait) -> Result<bool, ExpectError> {
        if self.prompt_patterns.is_empty() {
            return Err(ExpectError::PromptNotSet);
        }

        let mut patterns = self.prompt_patterns.clone();
        patterns.push(Pattern::Timeout);

        let result = self.expect_any(&patterns, wait)?;
        Ok(result.pattern_index != patterns.len() - 1)
    }

    /// Skip past a backlog of prompts already queued in the output.
    ///
    /// A session attached to a shell that has been idle for a while can find
    /// several stale prompts buffered ahead of any fresh output. Matches the
    /// active prompt pattern with a one-second budget per attempt until an
    /// attempt times out, leaving the session positioned just after the most
    /// recent prompt. The final, failing attempt always costs the full second.
    ///
    /// # Errors
    ///
    /// Fails with `PromptNotSet` if no prompt pattern is configured.
    pub fn search_last_prompt(&mut self) -> Result<(), ExpectError> {
        while self.prompt(Wait::For(LAST_PROMPT_TIMEOUT))? {}
        Ok(())
    }

    /// Capture one idle round trip: send a bare line terminator, then read
    /// single characters until the line goes quiet.
    ///
    /// The first character gets `0.5 * sync_multiplier` seconds to show up;
    /// each subsequent character gets the same inter-character budget; the
    /// whole capture stops after `2.0 * sync_multiplier` seconds. The result
    /// may be empty.
    fn try_read_prompt(&mut self, sync_multiplier: f64) -> Result<String, ExpectError> {
        let char_timeout = Duration::from_secs_f64((0.5 * sync_multiplier).max(0.0));
        let total_timeout = Duration::from_secs_f64((2.0 * sync_multiplier).max(0.0));

        self.sendline("")?;

        let mut captured = String::new();
        let begin = Instant::now();

        while begin.elapsed() < total_timeout {
            match self.read_valid(1, Wait::For(char_timeout)) {
                Ok(text) => captured.push_str(&text),
                Err(ExpectError::Timeout { .. }) => break,
                Err(e) => return Err(e),
            }
        }

        Ok(captured)
    }

    /// Confirm the remote end sits at an idle, repeating prompt.
    ///
    /// Performs two capture round trips and compares them by edit distance:
    /// two consecutive idle prompts should look nearly identical, while
    /// scrolling or changing output will not. Returns the second capture on
    /// success, `None` when the captures disagree or the first capture is
    /// empty.
    ///
    /// `do_clear` performs one extra, discarded round trip first to flush
    /// stale buffered output.
    pub fn sync_original_prompt(
        &mut self,
        sync_multiplier: f64,
        do_clear: bool,
    ) -> Result<Option<String>, ExpectError> {
        if do_clear {
            self.try_read_prompt(sync_multiplier)?;
        }

        let first = self.try_read_prompt(sync_multiplier)?;
        let second = self.try_read_prompt(sync_multiplier)?;

        if first.is_empty() {
            // No reference text, no meaningful ratio.
            return Ok(None);
        }

        let distance = levenshtein(&first, &second);
        let ratio = distance as f64 / first.chars().count() as f64;
        log::debug!("prompt sync ratio {ratio:.3} (distance {distance})");

        if ratio < SYNC_RATIO_MAX {
            Ok(Some(second))
        } else {
            Ok(None)
        }
    }

    /// Force the remote shell to emit the unique prompt.
    ///
    /// Only meaningful when the far end is a Linux-style shell. Disables
    /// `PROMPT_COMMAND`, installs [`UNIQUE_PROMPT`] as the active pattern,
    /// and sends the POSIX `PS1` assignment; if the new prompt never echoes
    /// back, assumes a C-shell dialect and retries once with `set prompt`.
    /// Returns `false` if both attempts time out.
    pub fn set_unique_prompt(&mut self) -> Result<bool, ExpectError> {
        self.sendline("unset PROMPT_COMMAND")?;
        self.set_prompt(Pattern::regex(UNIQUE_PROMPT)?);

        self.sendline(PROMPT_SET_SH)?;
        if !self.prompt(Wait::For(PROMPT_SET_TIMEOUT))? {
            self.sendline(PROMPT_SET_CSH)?;
            if !self.prompt(Wait::For(PROMPT_SET_TIMEOUT))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Prepare a Linux-style shell session for prompt-based interaction.
    ///
    /// Synchronizes with the original prompt, then (when `auto_prompt_reset`
    /// is set) installs the unique prompt. On either failure the session is
    /// closed before the error is returned; a desynchronized session is
    /// unsafe to keep using.
    ///
    /// # Errors
    ///
    /// `SyncFailed` when synchronization fails, `PromptSetFailed` (carrying
    /// the last-seen output and the expected pattern) when the unique prompt
    /// cannot be installed.
    pub fn init_linux_prompt(
        &mut self,
        auto_prompt_reset: bool,
        sync_multiplier: f64,
    ) -> Result<(), ExpectError> {
        if self.sync_original_prompt(sync_multiplier, true)?.is_none() {
            self.close()?;
            return Err(ExpectError::SyncFailed);
        }

        if auto_prompt_reset && !self.set_unique_prompt()? {
            let seen = self.before().to_string();
            self.close()?;
            return Err(ExpectError::PromptSetFailed {
                seen,
                expected: UNIQUE_PROMPT.to_string(),
            });
        }

        Ok(())
    }
}
