/// An out stream allows us to push values to it, but not pull. Basically a safer
/// way of passing around a mut& Vec while maintaining that we only ever append
/// to it. The emitters all write their assembly lines through one of these, so
/// previously emitted instructions can never be disturbed.
pub struct OutStream<'a, T> {
    buffer: &'a mut Vec<T>,
}

impl<'a, T> OutStream<'a, T> {
    pub fn new(buffer: &mut Vec<T>) -> OutStream<'_, T> {
        OutStream { buffer }
    }

    pub fn push(&mut self, t: T) {
        self.buffer.push(t);
    }

    /// Appends a whole batch of values, in order.
    pub fn push_all(&mut self, ts: impl IntoIterator<Item = T>) {
        self.buffer.extend(ts);
    }
}
