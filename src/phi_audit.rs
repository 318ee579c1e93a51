// Static check over every source file: tracing calls must not carry patient
// or prescription free text. Log opaque ids, counts and statuses instead.
