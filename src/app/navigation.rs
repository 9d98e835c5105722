//! Module selection, history stack and the generation counter.
//!
//! Every selection change bumps the generation. Async results carry the
//! generation they were issued under; anything older than the current one is
//! stale and gets dropped.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSelection {
    pub module: String,
    /// 0 is the module's root page, `i + 1` its i-th sub-page.
    pub sub_module: usize,
    pub args: Vec<String>,
}

impl ModuleSelection {
    pub fn new(module: impl Into<String>, sub_module: usize) -> Self {
        Self {
            module: module.into(),
            sub_module,
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct History {
    entries: Vec<ModuleSelection>,
    cursor: usize,
}

impl History {
    /// Appends after the cursor, dropping any forward entries.
    pub fn push(&mut self, entry: ModuleSelection) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    pub fn back(&mut self) -> Option<&ModuleSelection> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    pub fn forward(&mut self) -> Option<&ModuleSelection> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

#[derive(Debug, Default)]
pub struct Navigator {
    current: Option<ModuleSelection>,
    history: History,
    generation: u64,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ModuleSelection> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    fn enter(&mut self, selection: ModuleSelection) -> ModuleSelection {
        self.generation += 1;
        self.current = Some(selection.clone());
        selection
    }

    /// Explicit selection: args reset and a history entry is pushed.
    pub fn select(&mut self, module: &str, sub_module: usize) -> ModuleSelection {
        let selection = ModuleSelection::new(module, sub_module);
        self.history.push(selection.clone());
        self.enter(selection)
    }

    /// Replaces the arguments of the current selection. `None` with nothing selected.
    pub fn set_args(&mut self, args: Vec<String>) -> Option<ModuleSelection> {
        let mut selection = self.current.clone()?;
        selection.args = args;
        self.history.push(selection.clone());
        Some(self.enter(selection))
    }

    /// Restores the previous entry verbatim.
    pub fn back(&mut self) -> Option<ModuleSelection> {
        let entry = self.history.back()?.clone();
        Some(self.enter(entry))
    }

    pub fn forward(&mut self) -> Option<ModuleSelection> {
        let entry = self.history.forward()?.clone();
        Some(self.enter(entry))
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.history.clear();
        self.generation += 1;
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_resets_args_and_bumps_generation() {
        let mut nav = Navigator::new();
        nav.select("services", 0);
        nav.set_args(vec!["nginx".into()]);
        let g = nav.generation();
        let sel = nav.select("services", 1);
        assert!(sel.args.is_empty());
        assert_eq!(nav.generation(), g + 1);
        assert!(!nav.is_current(g));
    }

    #[test]
    fn test_back_restores_entry_verbatim() {
        let mut nav = Navigator::new();
        nav.select("a", 0);
        nav.set_args(vec!["7".into()]);
        nav.select("b", 2);
        let back = nav.back().unwrap();
        assert_eq!(back.module, "a");
        assert_eq!(back.args, vec!["7"]);
        assert_eq!(nav.current(), Some(&back));
        let back = nav.back().unwrap();
        assert!(back.args.is_empty());
        assert!(nav.back().is_none());
        assert_eq!(nav.forward().unwrap().args, vec!["7"]);
    }

    #[test]
    fn test_push_after_back_truncates_forward() {
        let mut nav = Navigator::new();
        nav.select("a", 0);
        nav.select("b", 0);
        nav.select("c", 0);
        nav.back();
        nav.back();
        nav.select("d", 0);
        assert_eq!(nav.history_len(), 2);
        assert!(nav.forward().is_none());
        assert_eq!(nav.back().unwrap().module, "a");
    }

    #[test]
    fn test_set_args_without_selection() {
        let mut nav = Navigator::new();
        assert!(nav.set_args(vec!["x".into()]).is_none());
        assert_eq!(nav.generation(), 0);
    }
}
