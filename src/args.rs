/// Forward-only cursor over the process argument list.
#[derive(Debug, Clone)]
pub struct ArgCursor {
    args: Vec<String>,
    position: usize,
}

impl ArgCursor {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            position: 0,
        }
    }

    pub fn peek(&self) -> Option<&str> {
        self.args.get(self.position).map(String::as_str)
    }

    pub fn advance(&mut self) -> Option<&str> {
        let current = self.args.get(self.position)?;
        self.position += 1;
        Some(current.as_str())
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.args.len()
    }

    /// Consumes every argument that has not been visited yet.
    pub fn remaining(&mut self) -> &[String] {
        let rest = &self.args[self.position.min(self.args.len())..];
        self.position = self.args.len();
        rest
    }
}
